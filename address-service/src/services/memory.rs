use crate::models::{Address, AddressPatch, AddressQuery, Credential};
use crate::services::store::{AddressStore, CredentialStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use service_core::error::AppError;

/// In-memory store backend for local development and tests. Semantics match
/// the MongoDB adapter, including upsert on partial update of a missing key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    addresses: DashMap<(String, String), Address>,
    credentials: DashMap<String, Credential>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn blank_address(user_id: &str, address_id: &str, updated_at: DateTime<Utc>) -> Address {
    Address {
        address_id: address_id.to_string(),
        user_id: user_id.to_string(),
        street_address: String::new(),
        suburb: String::new(),
        state: None,
        postcode: String::new(),
        country: String::new(),
        address_type: None,
        created_at: None,
        updated_at,
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn insert(&self, address: &Address) -> Result<(), AppError> {
        self.addresses.insert(
            (address.user_id.clone(), address.address_id.clone()),
            address.clone(),
        );
        Ok(())
    }

    async fn list(&self, user_id: &str, query: &AddressQuery) -> Result<Vec<Address>, AppError> {
        let mut matches: Vec<Address> = self
            .addresses
            .iter()
            .filter(|entry| {
                let address = entry.value();
                address.user_id == user_id
                    && query
                        .suburb
                        .as_deref()
                        .map_or(true, |suburb| address.suburb == suburb)
                    && query
                        .postcode
                        .as_deref()
                        .map_or(true, |postcode| address.postcode == postcode)
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first, like the database adapter
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.address_id.cmp(&b.address_id))
        });

        Ok(matches)
    }

    async fn apply_patch(
        &self,
        user_id: &str,
        address_id: &str,
        patch: &AddressPatch,
    ) -> Result<Address, AppError> {
        let key = (user_id.to_string(), address_id.to_string());
        let mut entry = self
            .addresses
            .entry(key)
            .or_insert_with(|| blank_address(user_id, address_id, patch.updated_at));
        patch.apply_to(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn delete(&self, user_id: &str, address_id: &str) -> Result<(), AppError> {
        self.addresses
            .remove(&(user_id.to_string(), address_id.to_string()));
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Credential>, AppError> {
        Ok(self
            .credentials
            .get(client_id)
            .map(|entry| entry.value().clone()))
    }

    async fn insert(&self, credential: &Credential) -> Result<(), AppError> {
        self.credentials
            .insert(credential.client_id.clone(), credential.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::State;

    fn sample_address(user_id: &str, suburb: &str, postcode: &str) -> Address {
        Address::new(
            user_id.to_string(),
            "123 Main Street".to_string(),
            suburb.to_string(),
            State::NSW,
            postcode.to_string(),
            "Australia".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn list_scopes_to_user_and_filters() {
        let store = MemoryStore::new();
        AddressStore::insert(&store, &sample_address("user_a", "Sydney", "2000"))
            .await
            .unwrap();
        AddressStore::insert(&store, &sample_address("user_a", "Newtown", "2042"))
            .await
            .unwrap();
        AddressStore::insert(&store, &sample_address("user_b", "Sydney", "2000"))
            .await
            .unwrap();

        let all = store.list("user_a", &AddressQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_suburb = store
            .list(
                "user_a",
                &AddressQuery {
                    suburb: Some("Sydney".to_string()),
                    postcode: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(by_suburb.len(), 1);
        assert_eq!(by_suburb[0].suburb, "Sydney");

        let by_postcode = store
            .list(
                "user_a",
                &AddressQuery {
                    suburb: None,
                    postcode: Some("2042".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(by_postcode.len(), 1);
        assert_eq!(by_postcode[0].postcode, "2042");
    }

    #[tokio::test]
    async fn patch_of_missing_key_materializes_partial_record() {
        let store = MemoryStore::new();
        let patch = AddressPatch {
            street_address: None,
            suburb: Some("Glebe".to_string()),
            state: None,
            postcode: None,
            country: None,
            address_type: None,
            updated_at: Utc::now(),
        };

        let record = store
            .apply_patch("user_a", "c56a4180-65aa-42ec-a945-5fd21dec0538", &patch)
            .await
            .unwrap();

        assert_eq!(record.suburb, "Glebe");
        assert!(record.street_address.is_empty());
        assert!(record.state.is_none());
        assert!(record.created_at.is_none());
        assert_eq!(record.updated_at, patch.updated_at);

        // And the partial record is visible to subsequent reads
        let listed = store.list("user_a", &AddressQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_unconditional() {
        let store = MemoryStore::new();
        let address = sample_address("user_a", "Sydney", "2000");
        AddressStore::insert(&store, &address).await.unwrap();

        store
            .delete("user_a", &address.address_id)
            .await
            .unwrap();
        assert!(store
            .list("user_a", &AddressQuery::default())
            .await
            .unwrap()
            .is_empty());

        // Deleting again is still fine
        store
            .delete("user_a", &address.address_id)
            .await
            .unwrap();
    }
}
