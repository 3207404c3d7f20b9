use sdm_mac::{MasterKey, SdmError};
use thiserror::Error;

/// Errors raised while fetching the master key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("master key is malformed: {0}")]
    Malformed(#[source] SdmError),
}

/// Supplies the SDM MAC master key to the request boundary.
pub trait KeyProvider {
    fn master_key(&self) -> Result<MasterKey, KeyError>;
}

/// Key fixed at startup, typically decoded from the config file.
pub struct StaticKey {
    key: MasterKey,
}

impl StaticKey {
    pub fn new(key: MasterKey) -> Self {
        StaticKey { key }
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        MasterKey::from_hex(hex)
            .map(Self::new)
            .map_err(KeyError::Malformed)
    }
}

impl KeyProvider for StaticKey {
    fn master_key(&self) -> Result<MasterKey, KeyError> {
        Ok(self.key.clone())
    }
}

/// Key read from an environment variable on every call, so a restart with a
/// new value is not required to pick it up.
pub struct EnvKey {
    var: String,
}

impl EnvKey {
    pub fn new(var: impl Into<String>) -> Self {
        EnvKey { var: var.into() }
    }
}

impl KeyProvider for EnvKey {
    fn master_key(&self) -> Result<MasterKey, KeyError> {
        let hex = std::env::var(&self.var).map_err(|_| KeyError::MissingEnv(self.var.clone()))?;
        MasterKey::from_hex(&hex).map_err(KeyError::Malformed)
    }
}
