/// Structured error types for musicshop-core.
///
/// The CLI wraps these with `anyhow` context; library consumers
/// match on the variants.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for `ShopConfig`
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Environment override could not be parsed
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: String, value: String },

    /// Loaded values are inconsistent
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Result type alias for musicshop-core operations
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub fn invalid_env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid_env("SERVER_PORT", "eighty");
        assert_eq!(err.to_string(), "invalid value for SERVER_PORT: 'eighty'");

        let err = ConfigError::invalid("postgres.url is empty");
        assert!(err.to_string().contains("postgres.url"));
    }
}
