//! Client configuration
//!
//! A flat JSON document describing one device:
//!
//! ```json
//! { "host": "192.168.1.50", "mac": "f4:91:1e:12:34:56", "encryption_version": 2 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::constants::{DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::crypto::{DeviceKey, ProtocolVersion};
use crate::device::{DeviceEndpoint, GreeDevice};
use crate::error::{GreeError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Hostname or IP address of the unit
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// MAC-like device identifier, normalized before use
    pub mac: String,

    /// Reply timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 1 = AES-ECB, 2 = AES-GCM
    #[serde(default = "default_encryption_version")]
    pub encryption_version: u8,

    /// Previously obtained device key; skips the bind handshake when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_encryption_version() -> u8 {
    1
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            mac: mac.into(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            encryption_version: default_encryption_version(),
            encryption_key: None,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| GreeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading client config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| GreeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Reject values that would only fail later, at the first exchange
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(GreeError::InvalidConfig("host must not be empty".to_string()));
        }
        if self.endpoint().device_id.is_empty() {
            return Err(GreeError::InvalidConfig("mac must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(GreeError::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        self.protocol_version()?;
        self.device_key()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.host.clone(), self.port, &self.mac, self.timeout())
    }

    pub fn protocol_version(&self) -> Result<ProtocolVersion> {
        ProtocolVersion::from_number(self.encryption_version)
    }

    /// The configured key, if any. Empty strings count as unset.
    pub fn device_key(&self) -> Result<Option<DeviceKey>> {
        match self.encryption_key.as_deref() {
            None | Some("") => Ok(None),
            Some(key) => DeviceKey::try_from(key).map(Some),
        }
    }

    /// Build a UDP client, already bound if a key is configured
    pub fn connect(&self) -> Result<GreeDevice> {
        let version = self.protocol_version()?;
        let device = GreeDevice::new(self.endpoint(), version);
        Ok(match self.device_key()? {
            Some(key) => device.with_key(key),
            None => device,
        })
    }
}
