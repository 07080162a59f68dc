/// Transaction builder for legacy amino-JSON `StdTx` transfers
///
/// The signed payload is a `StdSignDoc` rendered as canonical JSON: keys
/// sorted at every level, no whitespace, and `<`, `>`, `&`, U+2028, U+2029
/// escaped the way Go's encoder does. Any deviation produces a signature the
/// chain rejects even though local signing succeeds.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::chain::address::{Address, AddressCodec, Bech32Codec};
use crate::chain::error::{ClientError, Result};
use crate::chain::network::NetworkConfig;
use crate::chain::types::{Account, Coin};

pub const MSG_SEND_TYPE: &str = "thorchain/MsgSend";
pub const PUBKEY_SECP256K1_TYPE: &str = "tendermint/PubKeySecp256k1";
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Transfer of coins between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Vec<Coin>,
}

/// Amino envelope: `{"type": ..., "value": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Msg {
    #[serde(rename = "thorchain/MsgSend")]
    Send(MsgSend),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    #[serde(serialize_with = "u64_as_string")]
    pub gas: u64,
}

/// Unsigned transaction plus the account context it must be signed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub msgs: Vec<Msg>,
    pub fee: StdFee,
    pub memo: String,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

#[derive(Serialize)]
struct StdSignDoc<'a> {
    #[serde(serialize_with = "u64_as_string")]
    account_number: u64,
    chain_id: &'a str,
    fee: &'a StdFee,
    memo: &'a str,
    msgs: &'a [Msg],
    #[serde(serialize_with = "u64_as_string")]
    sequence: u64,
}

impl UnsignedTx {
    /// Canonical bytes the signature commits to.
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        let doc = StdSignDoc {
            account_number: self.account_number,
            chain_id: &self.chain_id,
            fee: &self.fee,
            memo: &self.memo,
            msgs: &self.msgs,
            sequence: self.sequence,
        };
        canonical_json(&doc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PubKeyJson {
    #[serde(rename = "type")]
    pub key_type: String,
    /// base64 of the 33-byte compressed key
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdSignature {
    pub pub_key: PubKeyJson,
    /// base64 of the 64-byte compact signature
    pub signature: String,
    #[serde(serialize_with = "u64_as_string")]
    pub account_number: u64,
    #[serde(serialize_with = "u64_as_string")]
    pub sequence: u64,
}

/// Signed `StdTx`. Built only by a signer; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTx {
    msg: Vec<Msg>,
    fee: StdFee,
    signatures: Vec<StdSignature>,
    memo: String,
}

impl SignedTx {
    pub(crate) fn new(unsigned: UnsignedTx, signature: StdSignature) -> Self {
        Self {
            msg: unsigned.msgs,
            fee: unsigned.fee,
            signatures: vec![signature],
            memo: unsigned.memo,
        }
    }

    pub fn msgs(&self) -> &[Msg] {
        &self.msg
    }

    pub fn fee(&self) -> &StdFee {
        &self.fee
    }

    pub fn signatures(&self) -> &[StdSignature] {
        &self.signatures
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }
}

/// Builds send messages and unsigned transactions for one network.
pub struct TxBuilder<C: AddressCodec = Bech32Codec> {
    prefix: String,
    chain_id: String,
    gas_limit: u64,
    codec: C,
}

impl TxBuilder<Bech32Codec> {
    pub fn new(network: &NetworkConfig) -> Self {
        Self::with_codec(network, Bech32Codec)
    }
}

impl<C: AddressCodec> TxBuilder<C> {
    pub fn with_codec(network: &NetworkConfig, codec: C) -> Self {
        Self {
            prefix: network.prefix.as_str().to_string(),
            chain_id: network.chain_id.clone(),
            gas_limit: DEFAULT_GAS_LIMIT,
            codec,
        }
    }

    /// Builder pattern method to set gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn build_send_message(&self, from: &str, to: &str, coins: Vec<Coin>) -> Result<MsgSend> {
        for address in [from, to] {
            if !self.codec.validate(address, &self.prefix) {
                return Err(ClientError::InvalidAddress {
                    address: address.to_string(),
                    expected_prefix: self.prefix.clone(),
                });
            }
        }
        if coins.is_empty() {
            return Err(ClientError::InvalidCoin("a transfer needs at least one coin".to_string()));
        }

        Ok(MsgSend {
            from_address: from.to_string(),
            to_address: to.to_string(),
            amount: coins,
        })
    }

    /// `account` must have been fetched immediately before; a stale sequence
    /// is only detected by the chain.
    pub fn build_unsigned_tx(&self, message: MsgSend, account: &Account, memo: Option<&str>) -> UnsignedTx {
        UnsignedTx {
            msgs: vec![Msg::Send(message)],
            fee: StdFee {
                amount: vec![],
                gas: self.gas_limit,
            },
            memo: memo.unwrap_or_default().to_string(),
            chain_id: self.chain_id.clone(),
            account_number: account.account_number,
            sequence: account.sequence,
        }
    }
}

fn u64_as_string<S: Serializer>(value: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Sorted-key compact JSON with Go-compatible escaping.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value)
        .map_err(|e| ClientError::Encoding(format!("cannot serialize sign doc: {}", e)))?;
    let mut out = String::new();
    write_sorted(&value, &mut out);

    let escaped = out
        .replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");
    Ok(escaped.into_bytes())
}

// Key order must not depend on serde_json's `preserve_order` feature.
fn write_sorted(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_sorted(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_sorted(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
