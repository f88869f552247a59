use crate::models::{Address, AddressPatch, AddressQuery, Credential};
use async_trait::async_trait;
use service_core::error::AppError;

/// Address collection operations: point insert, filtered range read, keyed
/// partial update and unconditional delete.
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn insert(&self, address: &Address) -> Result<(), AppError>;

    async fn list(&self, user_id: &str, query: &AddressQuery) -> Result<Vec<Address>, AppError>;

    /// Apply a partial update keyed by `(user_id, address_id)` and return
    /// the post-update record. A missing key upserts a partial record.
    async fn apply_patch(
        &self,
        user_id: &str,
        address_id: &str,
        patch: &AddressPatch,
    ) -> Result<Address, AppError>;

    /// Unconditional delete; succeeds whether or not the record exists.
    async fn delete(&self, user_id: &str, address_id: &str) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Credential lookups for the authorization path, plus the out-of-band
/// provisioning insert.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Credential>, AppError>;

    async fn insert(&self, credential: &Credential) -> Result<(), AppError>;
}
