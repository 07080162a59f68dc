/// Value types shared by the query, build, sign and broadcast stages

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chain::address::Address;
use crate::chain::error::{ClientError, Result};

/// A coin amount. `amount` is an unsigned integer kept as a string so that
/// arbitrarily large values survive without floating point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    /// Validate and normalize a coin. Leading zeros are stripped from the amount.
    pub fn new(denom: &str, amount: &str) -> Result<Self> {
        validate_denom(denom)?;
        let amount = normalize_amount(amount)?;
        Ok(Self {
            denom: denom.to_string(),
            amount,
        })
    }
}

fn validate_denom(denom: &str) -> Result<()> {
    // [a-zA-Z][a-zA-Z0-9/:._-]{2,127}
    let mut chars = denom.chars();
    let first_ok = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if !first_ok || !rest_ok || denom.len() < 3 || denom.len() > 128 {
        return Err(ClientError::InvalidCoin(format!("invalid denom `{}`", denom)));
    }
    Ok(())
}

fn normalize_amount(amount: &str) -> Result<String> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidCoin(format!(
            "amount `{}` is not an unsigned integer",
            amount
        )));
    }
    let digits = trimmed.trim_start_matches('0');
    Ok(if digits.is_empty() { "0".to_string() } else { digits.to_string() })
}

/// On-chain account state needed before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub account_number: u64,
    pub sequence: u64,
    pub coins: Vec<Coin>,
}

/// How long a broadcast waits before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Return after CheckTx
    #[default]
    Sync,
    /// Return immediately
    Async,
    /// Return after the tx is committed in a block
    Block,
}

impl BroadcastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastMode::Sync => "sync",
            BroadcastMode::Async => "async",
            BroadcastMode::Block => "block",
        }
    }
}

impl fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(BroadcastMode::Sync),
            "async" => Ok(BroadcastMode::Async),
            "block" => Ok(BroadcastMode::Block),
            other => Err(format!("unknown broadcast mode `{}`", other)),
        }
    }
}

/// Result of submitting a signed transaction.
///
/// A chain-side rejection (bad sequence, insufficient funds) is still a
/// `BroadcastResult`: `code` is non-zero and `raw_log` carries the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    #[serde(rename = "txhash", default)]
    pub tx_hash: String,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub height: u64,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub gas_wanted: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub gas_used: u64,
    #[serde(default)]
    pub logs: Option<serde_json::Value>,
}

impl BroadcastResult {
    /// True when the chain accepted the transaction.
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Parameters for a transfer that carries a memo (vault deposit, swap, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultTxParams {
    pub address_from: Option<Address>,
    pub address_to: Address,
    pub amount: String,
    pub asset: String,
    pub memo: String,
}

/// Parameters for a plain transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalTxParams {
    pub address_from: Option<Address>,
    pub address_to: Address,
    pub amount: String,
    pub asset: String,
}

/// Accepts `"123"`, `123` or `null` (as zero). The legacy REST API
/// encodes 64-bit integers as strings.
pub(crate) fn u64_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Num(n)) => Ok(n),
        Some(Raw::Str(s)) if s.is_empty() => Ok(0),
        Some(Raw::Str(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}
