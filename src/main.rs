use bellbot_api::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();

    let default_level = if config.api.enable_request_logging {
        "bellbot_api=debug,tower_http=debug"
    } else {
        "bellbot_api=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    tracing::info!("Starting BellBot API in {:?} mode", config.environment);

    bellbot_api::server::run(config).await
}
