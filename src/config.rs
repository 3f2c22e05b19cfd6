use crate::domain::merchant::MerchantMeta;
use crate::domain::message::{SUPPORTED_VERSIONS, VERSION_1_0_2};
use crate::error::{MpiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How authentication values are handed back to the merchant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// As received from the issuer.
    #[default]
    Base64,
    Hex,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStore {
    pub path: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    #[serde(default = "default_protocol")]
    pub default_protocol: String,
    /// Directory URLs per protocol, tried in order.
    #[serde(default)]
    pub directories: HashMap<String, Vec<String>>,
    #[serde(default = "default_directory_timeout_secs")]
    pub directory_timeout_secs: u64,
    #[serde(default = "default_pending_ttl_secs")]
    pub pending_ttl_secs: u64,
    #[serde(default)]
    pub incomplete_notification_url: Option<String>,
    #[serde(default)]
    pub key_store: Option<KeyStore>,
    #[serde(default)]
    pub cavv_encoding: ValueEncoding,
    #[serde(default)]
    pub xid_encoding: ValueEncoding,
    /// Return URL for the browser when neither request nor merchant has one.
    #[serde(default)]
    pub term_url: Option<String>,
    #[serde(default)]
    pub merchants: Vec<MerchantMeta>,
}

fn default_protocol_version() -> String {
    VERSION_1_0_2.to_string()
}

fn default_protocol() -> String {
    "ThreeDSecure".to_string()
}

fn default_directory_timeout_secs() -> u64 {
    30
}

fn default_pending_ttl_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol_version: default_protocol_version(),
            default_protocol: default_protocol(),
            directories: HashMap::new(),
            directory_timeout_secs: default_directory_timeout_secs(),
            pending_ttl_secs: default_pending_ttl_secs(),
            incomplete_notification_url: None,
            key_store: None,
            cavv_encoding: ValueEncoding::default(),
            xid_encoding: ValueEncoding::default(),
            term_url: None,
            merchants: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|err| MpiError::Config(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.protocol_version.as_str()) {
            return Err(MpiError::Config(format!(
                "unsupported protocol_version {}",
                self.protocol_version
            )));
        }
        if self.directory_urls_for(&self.default_protocol).is_empty() {
            return Err(MpiError::Config(format!(
                "no directory URLs for protocol {}",
                self.default_protocol
            )));
        }
        if self.pending_ttl_secs == 0 {
            return Err(MpiError::Config("pending_ttl_secs must be positive".to_string()));
        }
        if self.directory_timeout_secs == 0 {
            return Err(MpiError::Config(
                "directory_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn directory_urls_for(&self, protocol: &str) -> &[String] {
        self.directories.get(protocol).map_or(&[], Vec::as_slice)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory_timeout_secs)
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }
}
