//! `sniplet-server` binary entrypoint.
//!
//! Loads configuration from the environment (a `.env` file is honoured) or from
//! the YAML file named by `SNIPLET_CONFIG`, then serves the relay.

use anyhow::Context;
use sniplet_core::{config, relay};
use tracing::error;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Respect `RUST_LOG` if set; otherwise default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::load()
        .inspect_err(|e| error!(error = %e, "Invalid configuration"))
        .context("failed to load configuration")?;

    relay::serve(config).await.context("relay server failed")
}
