/// Network selection and the constants that follow from it.
///
/// Nothing here is cached: a `NetworkConfig` is rebuilt from the `Network`
/// every time it is needed, so a network switch can never leave a stale
/// endpoint or prefix behind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TESTNET_CLIENT_URL: &str = "http://168.119.22.92:1317";
pub const MAINNET_CLIENT_URL: &str = "http://13.250.144.124:1317";
pub const EXPLORER_URL: &str = "https://thorchain.net/";
pub const CHAIN_ID: &str = "thorchain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn prefix(&self) -> Prefix {
        match self {
            Network::Mainnet => Prefix::Thor,
            Network::Testnet => Prefix::Tthor,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("unknown network `{}` (expected mainnet or testnet)", other)),
        }
    }
}

/// Base account prefix of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Thor,
    Tthor,
}

impl Prefix {
    pub const ALL: [Prefix; 2] = [Prefix::Thor, Prefix::Tthor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::Thor => "thor",
            Prefix::Tthor => "tthor",
        }
    }

    /// The full address family derived from the base prefix.
    pub fn family(&self) -> PrefixFamily {
        PrefixFamily::new(self.as_str())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable parts for every address class of one network.
/// Only `account` is used by this client's operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFamily {
    pub account: String,
    pub account_pub: String,
    pub validator_operator: String,
    pub validator_operator_pub: String,
    pub validator_consensus: String,
    pub validator_consensus_pub: String,
}

impl PrefixFamily {
    fn new(base: &str) -> Self {
        Self {
            account: base.to_string(),
            account_pub: format!("{}pub", base),
            validator_operator: format!("{}valoper", base),
            validator_operator_pub: format!("{}valoperpub", base),
            validator_consensus: format!("{}valcons", base),
            validator_consensus_pub: format!("{}valconspub", base),
        }
    }

    pub fn all(&self) -> [&str; 6] {
        [
            &self.account,
            &self.account_pub,
            &self.validator_operator,
            &self.validator_operator_pub,
            &self.validator_consensus,
            &self.validator_consensus_pub,
        ]
    }

    pub fn contains(&self, hrp: &str) -> bool {
        self.all().iter().any(|p| *p == hrp)
    }
}

/// Optional REST endpoint overrides, typically loaded from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mainnet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testnet: Option<String>,
}

/// Everything that depends on the selected network, as one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub client_url: String,
    pub explorer_url: String,
    pub chain_id: String,
    pub prefix: Prefix,
}

impl NetworkConfig {
    pub fn resolve(network: Network, overrides: &EndpointOverrides) -> Self {
        let override_url = match network {
            Network::Mainnet => overrides.mainnet.as_deref(),
            Network::Testnet => overrides.testnet.as_deref(),
        };
        let default_url = match network {
            Network::Mainnet => MAINNET_CLIENT_URL,
            Network::Testnet => TESTNET_CLIENT_URL,
        };

        Self {
            network,
            client_url: override_url
                .unwrap_or(default_url)
                .trim_end_matches('/')
                .to_string(),
            explorer_url: EXPLORER_URL.to_string(),
            chain_id: CHAIN_ID.to_string(),
            prefix: network.prefix(),
        }
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("{}address/{}", self.explorer_url, address)
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}tx/{}", self.explorer_url, tx_hash)
    }
}
