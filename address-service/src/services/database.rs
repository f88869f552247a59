use crate::models::{Address, AddressPatch, AddressQuery, Credential};
use crate::services::store::{AddressStore, CredentialStore};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for address-service");

        let addresses = self.addresses();

        // Primary partition: every query on the collection includes user_id
        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_lookup".to_string())
                    .build(),
            )
            .build();

        addresses.create_index(user_index, None).await.map_err(|e| {
            tracing::error!("Failed to create user_id index on addresses: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on addresses.user_id");

        // Suburb-oriented secondary ordering
        let suburb_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "suburb": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_suburb_lookup".to_string())
                    .build(),
            )
            .build();

        addresses
            .create_index(suburb_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create (user_id, suburb) index on addresses: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on addresses.(user_id, suburb)");

        // Postcode-oriented secondary ordering
        let postcode_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "postcode": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_postcode_lookup".to_string())
                    .build(),
            )
            .build();

        addresses
            .create_index(postcode_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create (user_id, postcode) index on addresses: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on addresses.(user_id, postcode)");

        Ok(())
    }

    fn addresses(&self) -> Collection<Address> {
        self.db.collection("addresses")
    }

    fn credentials(&self) -> Collection<Credential> {
        self.db.collection("credentials")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Translate a patch into a `$set` document. Values come from the closed
    /// patch struct, never from request text.
    fn set_document(patch: &AddressPatch) -> Document {
        let mut set = doc! {
            "updated_at": mongodb::bson::DateTime::from_chrono(patch.updated_at),
        };
        if let Some(value) = &patch.street_address {
            set.insert("street_address", value.as_str());
        }
        if let Some(value) = &patch.suburb {
            set.insert("suburb", value.as_str());
        }
        if let Some(state) = patch.state {
            set.insert("state", state.to_string());
        }
        if let Some(value) = &patch.postcode {
            set.insert("postcode", value.as_str());
        }
        if let Some(value) = &patch.country {
            set.insert("country", value.as_str());
        }
        if let Some(address_type) = patch.address_type {
            set.insert("address_type", address_type.to_string());
        }
        set
    }
}

#[async_trait]
impl AddressStore for MongoStore {
    async fn insert(&self, address: &Address) -> Result<(), AppError> {
        self.addresses()
            .insert_one(address, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to insert address {} into database: {}",
                    address.address_id,
                    e
                );
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn list(&self, user_id: &str, query: &AddressQuery) -> Result<Vec<Address>, AppError> {
        let mut filter = doc! { "user_id": user_id };
        if let Some(suburb) = &query.suburb {
            filter.insert("suburb", suburb.as_str());
        }
        if let Some(postcode) = &query.postcode {
            filter.insert("postcode", postcode.as_str());
        }

        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": 1 })
            .build();

        let cursor = self
            .addresses()
            .find(filter, find_options)
            .await
            .map_err(AppError::from)?;

        cursor.try_collect().await.map_err(AppError::from)
    }

    async fn apply_patch(
        &self,
        user_id: &str,
        address_id: &str,
        patch: &AddressPatch,
    ) -> Result<Address, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .addresses()
            .find_one_and_update(
                doc! { "_id": address_id, "user_id": user_id },
                doc! { "$set": Self::set_document(patch) },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to update address {}: {}", address_id, e);
                AppError::from(e)
            })?;

        updated.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!("update returned no document"))
        })
    }

    async fn delete(&self, user_id: &str, address_id: &str) -> Result<(), AppError> {
        self.addresses()
            .delete_one(doc! { "_id": address_id, "user_id": user_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete address {}: {}", address_id, e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MongoStore {
    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Credential>, AppError> {
        self.credentials()
            .find_one(doc! { "_id": client_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up client credential: {}", e);
                AppError::from(e)
            })
    }

    async fn insert(&self, credential: &Credential) -> Result<(), AppError> {
        self.credentials()
            .insert_one(credential, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert client credential: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
