//! Tracing setup for the musicshop CLI
//!
//! Usage:
//!   musicshop --debug serve              # Debug logging to console
//!   RUST_LOG=musicshop_server=trace ...  # Fine-grained log control
//!
//! Precedence: RUST_LOG, then `--debug`, then `[log] level` from config.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Force debug level unless RUST_LOG is set
    pub debug: bool,
    /// Level from the `[log]` config section
    pub level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: "info".to_string(),
        }
    }
}

impl TracingConfig {
    fn fallback_directive(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.level
        }
    }
}

/// Initialize console tracing. Fails if a subscriber is already installed
/// or the configured level is not a valid filter directive.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.fallback_directive())
            .map_err(|e| anyhow!("invalid log level '{}': {}", config.level, e))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
