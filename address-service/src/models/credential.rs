use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use service_core::utils::digest;
use uuid::Uuid;

/// A client credential record. Only the SHA-256 hex digest of the secret is
/// ever persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "_id")]
    pub client_id: String,
    pub client_secret_hash: String,
    pub client_name: String,
    pub description: String,
    pub active: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Issue a fresh credential for out-of-band provisioning. The plaintext
    /// secret is returned exactly once and never stored.
    pub fn issue(client_name: &str, description: &str, valid_days: i64) -> (Self, String) {
        let mut secret_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret_bytes);
        let client_secret = hex::encode(secret_bytes);

        let now = Utc::now();
        let credential = Self {
            client_id: Uuid::new_v4().to_string(),
            client_secret_hash: digest::sha256_hex(&client_secret),
            client_name: client_name.to_string(),
            description: description.to_string(),
            active: true,
            created_at: now,
            expires_at: now + Duration::days(valid_days),
        };

        (credential, client_secret)
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }
}
