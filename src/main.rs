use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use leafscan::api::{app_router, start_server, ApiContext};
use leafscan::config::{self, AppConfig};
use leafscan::provider::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = AppConfig::from_env();
    let provider = GeminiClient::from_config(&app_config)?;
    let ctx = ApiContext::new(Arc::new(provider), &app_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    let mut server = start_server(app_router(ctx), addr).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    server.shutdown();
    server.join().await;

    Ok(())
}
