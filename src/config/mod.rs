use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chain::network::{EndpointOverrides, Network};
use crate::chain::rest_client::ClientConfig;
use crate::chain::tx_builder::DEFAULT_GAS_LIMIT;
use crate::chain::types::BroadcastMode;

/// Environment variable holding the mnemonic. Never stored in the config file.
pub const MNEMONIC_ENV: &str = "THOR_MNEMONIC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub client: ClientSettings,
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub network: Network,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    pub max_retries: u32,
    #[serde(default)]
    pub broadcast_mode: BroadcastMode,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            client: ClientSettings {
                network: Network::default(),
                request_timeout: defaults.request_timeout,
                connection_timeout: defaults.connection_timeout,
                max_retries: defaults.max_retries,
                broadcast_mode: defaults.broadcast_mode,
                gas_limit: defaults.gas_limit,
            },
            endpoints: EndpointOverrides::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.as_ref().display());
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/thorchain-client/config.toml` or the platform equivalent.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("thorchain-client")
            .join("config.toml")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connection_timeout: self.client.connection_timeout,
            request_timeout: self.client.request_timeout,
            max_retries: self.client.max_retries,
            broadcast_mode: self.client.broadcast_mode,
            gas_limit: self.client.gas_limit,
            endpoints: self.endpoints.clone(),
        }
    }
}
