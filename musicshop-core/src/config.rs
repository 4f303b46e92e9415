use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Service configuration
///
/// Sources, lowest to highest precedence: built-in defaults, the TOML
/// file, `.env` / process environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub app: AppConfig,
    pub http: HttpConfig,
    pub postgres: PostgresConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Allow any origin (default: false = localhost only)
    pub cors_permissive: bool,
    /// Deadline applied to every request's database work
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    /// Attempts made by the connection manager before giving up
    pub connect_attempts: u32,
    /// Pause between failed attempts
    pub retry_delay_ms: u64,
    /// Upper bound for acquiring a connection during an attempt
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "musicshop".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_permissive: false,
            request_timeout_secs: 30,
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/musicshop".to_string(),
            max_connections: 10,
            connect_attempts: 5,
            retry_delay_ms: 5_000,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PostgresConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ShopConfig {
    /// Load config from `path` (or ~/.musicshop/config.toml), then `.env`
    /// and the process environment.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }

        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Get config file path: ~/.musicshop/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".musicshop/config.toml")
    }

    /// Read a TOML file, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_NAME") {
            self.app.name = v;
        }
        if let Some(v) = lookup("APP_VERSION") {
            self.app.version = v;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.http.host = v;
        }
        override_parsed(&lookup, "SERVER_PORT", &mut self.http.port)?;
        override_parsed(&lookup, "SERVER_REQUEST_TIMEOUT_SECS", &mut self.http.request_timeout_secs)?;

        // POSTGRES_URL wins over the conventional DATABASE_URL
        if let Some(v) = lookup("POSTGRES_URL").or_else(|| lookup("DATABASE_URL")) {
            self.postgres.url = v;
        }
        override_parsed(&lookup, "POSTGRES_MAX_CONNECTIONS", &mut self.postgres.max_connections)?;
        override_parsed(&lookup, "POSTGRES_CONNECT_ATTEMPTS", &mut self.postgres.connect_attempts)?;
        override_parsed(&lookup, "POSTGRES_RETRY_DELAY_MS", &mut self.postgres.retry_delay_ms)?;
        override_parsed(
            &lookup,
            "POSTGRES_CONNECT_TIMEOUT_SECS",
            &mut self.postgres.connect_timeout_secs,
        )?;

        if let Some(v) = lookup("LOG_LEVEL") {
            self.log.level = v;
        }
        Ok(())
    }

    /// Reject values the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.postgres.url.trim().is_empty() {
            return Err(ConfigError::invalid("postgres.url is empty"));
        }
        if self.postgres.max_connections == 0 {
            return Err(ConfigError::invalid("postgres.max_connections must be at least 1"));
        }
        if self.postgres.connect_attempts == 0 {
            return Err(ConfigError::invalid("postgres.connect_attempts must be at least 1"));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("http.request_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_env(key, raw.clone()))?;
    }
    Ok(())
}
