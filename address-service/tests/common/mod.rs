use address_service::config::{AddressConfig, StoreBackend};
use address_service::models::Credential;
use address_service::services::CredentialStore;
use address_service::startup::Application;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;

pub const TEST_USER_ID: &str = "user_test_123";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client_id: String,
    pub client_secret: String,
    pub credentials: Arc<dyn CredentialStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut config = AddressConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.store.backend = StoreBackend::Memory;

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        // Seed a client credential the way the out-of-band provisioning
        // operation would
        let (credential, client_secret) =
            Credential::issue("integration-tests", "Integration test suite client", 1);
        let client_id = credential.client_id.clone();
        app.state()
            .credentials
            .insert(&credential)
            .await
            .expect("Failed to seed client credential");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let credentials = app.state().credentials.clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client_id,
            client_secret,
            credentials,
        }
    }

    /// `Authorization` header value for the seeded client.
    pub fn basic_auth(&self) -> String {
        basic_auth_header(&self.client_id, &self.client_secret)
    }

    pub fn addresses_url(&self, user_id: &str) -> String {
        format!("{}/v1/users/{}/addresses", self.address, user_id)
    }

    pub fn address_url(&self, user_id: &str, address_id: &str) -> String {
        format!("{}/v1/users/{}/addresses/{}", self.address, user_id, address_id)
    }

    /// POST an address payload for `user_id` with valid credentials.
    pub async fn post_address(
        &self,
        client: &reqwest::Client,
        user_id: &str,
        payload: &Value,
    ) -> reqwest::Response {
        client
            .post(self.addresses_url(user_id))
            .header("Authorization", self.basic_auth())
            .json(payload)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        BASE64.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// The standard valid creation payload used across tests.
pub fn sample_payload() -> Value {
    json!({
        "streetAddress": "123 Main Street",
        "suburb": "Sydney",
        "state": "NSW",
        "postcode": "2000"
    })
}
