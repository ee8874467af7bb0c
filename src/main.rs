//! invoice-desk server
//!
//! Usage: `invoice-desk [config.yaml]`
//!
//! Without a config file the built-in development configuration is used
//! (in-memory store, one demo user, a few seeded invoices).

use anyhow::Result;
use invoice_desk::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invoice_desk=info,tower_http=info")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "loading configuration");
            AppConfig::from_yaml_file(&path)?
        }
        None => {
            tracing::info!("no configuration file given, using development defaults");
            AppConfig::default_config()
        }
    };
    config.apply_env_overrides();

    let bind = config.server.bind.clone();
    ServerBuilder::from_config(&config).await?.serve(&bind).await
}
