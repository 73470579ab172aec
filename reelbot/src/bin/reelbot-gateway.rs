//! reelbot loopback gateway binary.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use reelbot::config::BotConfig;
use reelbot::gateway::{BotGateway, GatewayConfig};

#[derive(Parser, Debug)]
#[command(name = "reelbot-gateway")]
#[command(version)]
#[command(about = "Loopback chat gateway for the reelbot catalog assistant")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long, env = "REELBOT_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Shared secret required on every gateway request.
    #[arg(long, env = "REELBOT_GATEWAY_SECRET")]
    secret: String,

    /// Overrides the configured bind address.
    #[arg(long)]
    bind_addr: Option<String>,

    /// Overrides the configured catalog document path.
    #[arg(long)]
    catalog_path: Option<PathBuf>,

    /// Comma-separated caller ids allowed to mutate the catalog.
    #[arg(long, value_delimiter = ',')]
    admin_ids: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reelbot=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config_path {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::default(),
    };
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(catalog_path) = args.catalog_path {
        config.catalog_path = catalog_path;
    }
    if !args.admin_ids.is_empty() {
        config.admin_ids = args.admin_ids;
    }

    info!(catalog = %config.catalog_path.display(), admins = config.admin_ids.len(), "starting gateway");

    let gateway = GatewayConfig {
        bind_addr: config.bind_addr.clone(),
        shared_secret: args.secret,
    };
    BotGateway::start(config, gateway).await?;
    Ok(())
}
