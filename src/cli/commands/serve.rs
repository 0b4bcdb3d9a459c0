use clap::Args;

use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides BELLBOT_API_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port (overrides BELLBOT_API_PORT / PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    tracing::info!("Starting BellBot API in {:?} mode", config.environment);
    crate::server::run(config).await
}
