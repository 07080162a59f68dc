/// Bech32 address codec for the thor/tthor address families

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

use crate::chain::error::{ClientError, Result};
use crate::chain::network::Prefix;

/// Account addresses carry a 20-byte hash; module and contract accounts 32 bytes.
pub const ACCOUNT_PAYLOAD_LEN: usize = 20;
pub const MODULE_PAYLOAD_LEN: usize = 32;

pub type Address = String;

/// Encode, decode and validate addresses for a set of human-readable prefixes.
pub trait AddressCodec {
    fn encode(&self, prefix: &str, payload: &[u8]) -> Result<Address>;

    fn decode(&self, address: &str) -> Result<(String, Vec<u8>)>;

    /// Pure predicate: never fails, only answers.
    ///
    /// The decoded payload must re-encode to the exact input, which rejects
    /// upper-case and mixed-case spellings that would pass a prefix check.
    fn validate(&self, address: &str, expected_prefix: &str) -> bool {
        if expected_prefix.is_empty() || !address.starts_with(expected_prefix) {
            return false;
        }
        let Ok((prefix, payload)) = self.decode(address) else {
            return false;
        };
        if prefix != expected_prefix {
            return false;
        }
        match self.encode(&prefix, &payload) {
            Ok(reencoded) => reencoded == address,
            Err(_) => false,
        }
    }
}

/// BIP-173 bech32 (not bech32m), restricted to the thor and tthor families.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bech32Codec;

impl Bech32Codec {
    fn is_known_prefix(prefix: &str) -> bool {
        Prefix::ALL.iter().any(|p| p.family().contains(prefix))
    }

    fn check_payload_len(len: usize) -> bool {
        len == ACCOUNT_PAYLOAD_LEN || len == MODULE_PAYLOAD_LEN
    }
}

impl AddressCodec for Bech32Codec {
    fn encode(&self, prefix: &str, payload: &[u8]) -> Result<Address> {
        if !Self::check_payload_len(payload.len()) {
            return Err(ClientError::Encoding(format!(
                "payload must be {} or {} bytes, got {}",
                ACCOUNT_PAYLOAD_LEN,
                MODULE_PAYLOAD_LEN,
                payload.len()
            )));
        }
        let hrp = Hrp::parse(prefix)
            .map_err(|e| ClientError::Encoding(format!("invalid prefix `{}`: {}", prefix, e)))?;

        bech32::encode::<Bech32>(hrp, payload).map_err(|e| ClientError::Encoding(e.to_string()))
    }

    fn decode(&self, address: &str) -> Result<(String, Vec<u8>)> {
        let checked = CheckedHrpstring::new::<Bech32>(address)
            .map_err(|e| ClientError::Decoding(e.to_string()))?;

        let prefix = checked.hrp().to_lowercase();
        if !Self::is_known_prefix(&prefix) {
            return Err(ClientError::Decoding(format!("unknown prefix `{}`", prefix)));
        }

        let payload: Vec<u8> = checked.byte_iter().collect();
        if !Self::check_payload_len(payload.len()) {
            return Err(ClientError::Decoding(format!(
                "unexpected payload length {}",
                payload.len()
            )));
        }

        Ok((prefix, payload))
    }
}
