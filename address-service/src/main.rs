use address_service::config::AddressConfig;
use address_service::startup::Application;
use service_core::observability::init_logging;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logging("address-service", "info");

    let config = AddressConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
