use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use secp256k1::{ecdsa::Signature, Message, Secp256k1};
use sha2::{Digest, Sha256};

use crate::chain::error::{ClientError, Result};
use crate::chain::tx_builder::{PubKeyJson, SignedTx, StdSignature, UnsignedTx, PUBKEY_SECP256K1_TYPE};
use crate::chain::wallet::keys::PrivateKey;

/// Turns an unsigned transaction into a signed one.
pub trait TransactionSigner {
    fn sign(
        &self,
        unsigned_tx: UnsignedTx,
        private_key: &PrivateKey,
        account_number: u64,
        sequence: u64,
    ) -> Result<SignedTx>;
}

/// Transaction signer for cosmos-style secp256k1 accounts
/// SHA-256 digest, compact 64-byte low-S ECDSA signature
pub struct Secp256k1Signer {
    secp: Secp256k1<secp256k1::All>,
}

impl Secp256k1Signer {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Sign arbitrary bytes, then verify the result before handing it out.
    pub fn sign_payload(&self, payload: &[u8], private_key: &PrivateKey) -> Result<[u8; 64]> {
        let digest: [u8; 32] = Sha256::digest(payload).into();
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| ClientError::SigningInvariantViolation(e.to_string()))?;

        let secret_key = private_key.secret_key()?;
        let mut signature = self.secp.sign_ecdsa(&message, &secret_key);
        signature.normalize_s();

        let public_key = secp256k1::PublicKey::from_secret_key(&self.secp, &secret_key);
        self.secp
            .verify_ecdsa(&message, &signature, &public_key)
            .map_err(|e| ClientError::SigningInvariantViolation(format!("fresh signature does not verify: {}", e)))?;

        Ok(signature.serialize_compact())
    }

    /// Check a compact signature over `payload` against a compressed public key.
    pub fn verify_payload(&self, payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let digest: [u8; 32] = Sha256::digest(payload).into();
        let (Ok(message), Ok(signature), Ok(public_key)) = (
            Message::from_digest_slice(&digest),
            Signature::from_compact(signature),
            secp256k1::PublicKey::from_slice(public_key),
        ) else {
            return false;
        };
        self.secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
    }
}

impl Default for Secp256k1Signer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSigner for Secp256k1Signer {
    fn sign(
        &self,
        unsigned_tx: UnsignedTx,
        private_key: &PrivateKey,
        account_number: u64,
        sequence: u64,
    ) -> Result<SignedTx> {
        if unsigned_tx.account_number != account_number || unsigned_tx.sequence != sequence {
            return Err(ClientError::SigningInvariantViolation(format!(
                "tx built for account {}/{} but signing as {}/{}",
                unsigned_tx.account_number, unsigned_tx.sequence, account_number, sequence
            )));
        }

        let sign_bytes = unsigned_tx.sign_bytes()?;
        let signature = self.sign_payload(&sign_bytes, private_key)?;
        let public_key = private_key.public_key()?;

        log::debug!(
            "Signed tx for account_number={} sequence={} ({} sign bytes)",
            account_number,
            sequence,
            sign_bytes.len()
        );

        let std_signature = StdSignature {
            pub_key: PubKeyJson {
                key_type: PUBKEY_SECP256K1_TYPE.to_string(),
                value: BASE64.encode(public_key.as_bytes()),
            },
            signature: BASE64.encode(signature),
            account_number,
            sequence,
        };

        Ok(SignedTx::new(unsigned_tx, std_signature))
    }
}
