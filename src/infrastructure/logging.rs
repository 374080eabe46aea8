//! Logging initialization.
//!
//! Console output only; the configured level acts as the default and
//! `RUST_LOG` overrides it. Chatty dependency targets are capped unless
//! the level is `trace`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub use crate::infrastructure::config::LoggingConfig;

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let default_directives = if config.level == "trace" {
        config.level.clone()
    } else {
        // Keep sqlx statement logging and hyper internals out of normal runs.
        format!("{},sqlx=warn,hyper=warn,reqwest=warn,html5ever=warn", config.level)
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
