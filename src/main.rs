//! GOALCARD — goal-total probability card service.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! registers the configured prior providers and serves the HTTP API
//! until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use goalcard::api;
use goalcard::config;
use goalcard::engine::CardBuilder;

const BANNER: &str = r#"
   ___  ___   _   _      ___   _   ___ ___
  / __|/ _ \ /_\ | |    / __| /_\ | _ \   \
 | (_ | (_) / _ \| |__ | (__ / _ \|   / |) |
  \___|\___/_/ \_\____| \___/_/ \_\_|_\___/

  Goal-total probability cards
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");

    let port = match std::env::var("GOALCARD_PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("GOALCARD_PORT is not a valid port: {raw}"))?,
        Err(_) => cfg.server.port,
    };

    let builder = CardBuilder::from_config(&cfg)?;
    info!(
        port,
        anchor_weight = cfg.anchor.weight,
        providers = builder.provider_count(),
        timeout_secs = cfg.providers.timeout_secs,
        "GOALCARD starting up"
    );

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received.");
    };

    api::serve(Arc::new(builder), port, shutdown).await?;

    info!("GOALCARD shut down cleanly.");
    Ok(())
}

/// Initialise the tracing subscriber.
///
/// Uses `RUST_LOG` when set, otherwise `goalcard=info`. Set
/// `GOALCARD_LOG_JSON` for JSON lines.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("goalcard=info"));

    let json_logging = std::env::var("GOALCARD_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
