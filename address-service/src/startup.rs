use crate::config::{AddressConfig, StoreBackend};
use crate::handlers;
use crate::services::{AddressStore, CredentialStore, MemoryStore, MongoStore};
use axum::{
    routing::{get, patch, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Store handles are injected here; nothing holds
/// an ambient global client.
#[derive(Clone)]
pub struct AppState {
    pub config: AddressConfig,
    pub addresses: Arc<dyn AddressStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: AddressConfig) -> Result<Self, AppError> {
        let (addresses, credentials): (Arc<dyn AddressStore>, Arc<dyn CredentialStore>) =
            match config.store.backend {
                StoreBackend::Mongo => {
                    let store = MongoStore::connect(
                        &config.store.mongodb_uri,
                        &config.store.mongodb_database,
                    )
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?;
                    store.initialize_indexes().await.map_err(|e| {
                        tracing::error!("Failed to initialize database indexes: {}", e);
                        e
                    })?;
                    let store = Arc::new(store);
                    (
                        store.clone() as Arc<dyn AddressStore>,
                        store as Arc<dyn CredentialStore>,
                    )
                }
                StoreBackend::Memory => {
                    tracing::info!("Using in-memory store backend");
                    let store = Arc::new(MemoryStore::new());
                    (
                        store.clone() as Arc<dyn AddressStore>,
                        store as Arc<dyn CredentialStore>,
                    )
                }
            };

        let state = AppState {
            config: config.clone(),
            addresses,
            credentials,
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route(
                "/v1/users/:user_id/addresses",
                post(handlers::create_address).get(handlers::list_addresses),
            )
            .route(
                "/v1/users/:user_id/addresses/:address_id",
                patch(handlers::update_address).delete(handlers::delete_address),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
