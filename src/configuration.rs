use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::keys::{EnvKey, KeyError, KeyProvider, StaticKey};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    pub master_key: KeySource,
    #[serde(default)]
    pub expose_trace: bool,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeySource {
    Static { hex: String },
    Env { var: String },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Static { .. } => f.write_str("Static { hex: <redacted> }"),
            KeySource::Env { var } => f.debug_struct("Env").field("var", var).finish(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl ServerConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let conf_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&conf_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(conf_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(conf_str)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Invalid(format!("listen address {:?}: {e}", self.listen))
        })?;

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }

        match &self.master_key {
            KeySource::Static { hex } => {
                StaticKey::from_hex(hex)
                    .map_err(|e| ConfigError::Invalid(format!("master_key: {e}")))?;
            }
            KeySource::Env { var } if var.is_empty() => {
                return Err(ConfigError::Invalid(
                    "master_key: env var name is empty".to_string(),
                ));
            }
            KeySource::Env { .. } => {}
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build the key provider described by `master_key`.
    pub fn key_provider(&self) -> Result<Arc<dyn KeyProvider + Send + Sync>, KeyError> {
        Ok(match &self.master_key {
            KeySource::Static { hex } => Arc::new(StaticKey::from_hex(hex)?),
            KeySource::Env { var } => Arc::new(EnvKey::new(var.clone())),
        })
    }
}
