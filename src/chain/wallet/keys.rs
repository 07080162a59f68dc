use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use ripemd::Ripemd160;
use secp256k1::{Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::chain::address::{Address, AddressCodec, Bech32Codec};
use crate::chain::error::{ClientError, Result};

/// BIP44 path with THORChain's registered coin type 931
pub const THOR_HD_PATH: &str = "m/44'/931'/0'/0/0";

/// secp256k1 private key. Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; 32],
}

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        SecretKey::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidMnemonic(format!("derived key is not a valid scalar: {}", e)))?;
        Ok(Self { bytes })
    }

    /// Get the private key as a SecretKey (for signing)
    pub fn secret_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.bytes)
            .map_err(|e| ClientError::SigningInvariantViolation(format!("invalid private key: {}", e)))
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        let secp = Secp256k1::signing_only();
        let public_key = secp256k1::PublicKey::from_secret_key(&secp, &self.secret_key()?);
        Ok(PublicKey {
            bytes: public_key.serialize(),
        })
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Compressed (33-byte) secp256k1 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    bytes: [u8; 33],
}

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 33]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.bytes
    }

    /// RIPEMD-160 of SHA-256 of the compressed key: the 20-byte address payload.
    pub fn address_payload(&self) -> [u8; 20] {
        let sha = Sha256::digest(self.bytes);
        Ripemd160::digest(sha).into()
    }
}

/// mnemonic -> seed -> private key -> address
pub trait KeyDerivation {
    fn derive_private_key(&self, mnemonic: &str) -> Result<PrivateKey>;

    fn derive_address(&self, private_key: &PrivateKey, prefix: &str) -> Result<Address>;
}

/// BIP39 + BIP32 derivation over secp256k1, cosmos-style addresses.
#[derive(Debug, Clone)]
pub struct Secp256k1Keys {
    path: String,
    codec: Bech32Codec,
}

impl Secp256k1Keys {
    pub fn new() -> Self {
        Self::with_path(THOR_HD_PATH)
    }

    pub fn with_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            codec: Bech32Codec,
        }
    }
}

impl Default for Secp256k1Keys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDerivation for Secp256k1Keys {
    fn derive_private_key(&self, mnemonic: &str) -> Result<PrivateKey> {
        let mnemonic = Mnemonic::parse(mnemonic)
            .map_err(|e| ClientError::InvalidMnemonic(e.to_string()))?;

        let path: DerivationPath = self
            .path
            .parse()
            .map_err(|e| ClientError::InvalidMnemonic(format!("bad derivation path {}: {}", self.path, e)))?;

        let mut seed = mnemonic.to_seed("");
        let derived = XPrv::derive_from_path(&seed, &path)
            .map_err(|e| ClientError::InvalidMnemonic(format!("key derivation failed: {}", e)));
        seed.zeroize();

        PrivateKey::from_bytes(derived?.to_bytes())
    }

    fn derive_address(&self, private_key: &PrivateKey, prefix: &str) -> Result<Address> {
        let payload = private_key.public_key()?.address_payload();
        self.codec.encode(prefix, &payload)
    }
}

/// Check a phrase against the BIP39 wordlist and checksum.
pub fn validate_phrase(phrase: &str) -> bool {
    Mnemonic::parse(phrase).is_ok()
}

/// Generate a new 12-word mnemonic phrase.
pub fn generate_phrase() -> Result<String> {
    // 128 bits of entropy for a 12-word mnemonic
    let mut entropy = [0u8; 16];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| ClientError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();

    Ok(mnemonic?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "rural bright ball negative already grass good grant nation screen model pizza";
    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_known_vectors() {
        let keys = Secp256k1Keys::new();
        let key = keys.derive_private_key(PHRASE).unwrap();
        assert_eq!(
            hex::encode(key.public_key().unwrap().as_bytes()),
            "02c2f817eaef14ca839196295559d96b43816b4117c2c72336b3836c1304e36bc2"
        );
        assert_eq!(
            keys.derive_address(&key, "thor").unwrap(),
            "thor19kacmmyuf2ysyvq3t9nrl9495l5cvktjs0yfws"
        );
        assert_eq!(
            keys.derive_address(&key, "tthor").unwrap(),
            "tthor19kacmmyuf2ysyvq3t9nrl9495l5cvktj5c4eh4"
        );

        let key = keys.derive_private_key(ABANDON).unwrap();
        assert_eq!(
            keys.derive_address(&key, "thor").unwrap(),
            "thor1gm00vwsfcp48enm4uv9e5dhm37jtd0ye27wrx0"
        );
    }

    #[test]
    fn test_cosmos_hub_path_vector() {
        // Well-known cosmoshub vector confirms the hash160 + bech32 pipeline.
        let keys = Secp256k1Keys::with_path("m/44'/118'/0'/0/0");
        let key = keys.derive_private_key(ABANDON).unwrap();
        let payload = key.public_key().unwrap().address_payload();
        let address = bech32::encode::<bech32::Bech32>(bech32::Hrp::parse("cosmos").unwrap(), &payload).unwrap();
        assert_eq!(address, "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4");
    }

    #[test]
    fn test_deterministic_generation() {
        let keys = Secp256k1Keys::new();
        let key1 = keys.derive_private_key(PHRASE).unwrap();
        let key2 = keys.derive_private_key(PHRASE).unwrap();
        assert_eq!(key1.bytes, key2.bytes);
        assert_eq!(key1.public_key().unwrap(), key2.public_key().unwrap());
    }

    #[test]
    fn test_invalid_mnemonic() {
        let keys = Secp256k1Keys::new();
        // bad checksum word
        let result = keys.derive_private_key(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
        );
        assert!(matches!(result, Err(ClientError::InvalidMnemonic(_))));
        // word outside the list
        assert!(matches!(
            keys.derive_private_key("rural bright ball negative already grass good grant nation screen model pizzas"),
            Err(ClientError::InvalidMnemonic(_))
        ));
        assert!(matches!(keys.derive_private_key(""), Err(ClientError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_generate_phrase() {
        let phrase = generate_phrase().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert!(validate_phrase(&phrase));
        assert_ne!(phrase, generate_phrase().unwrap());
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = Secp256k1Keys::new().derive_private_key(PHRASE).unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("08709bc9"));
        assert!(printed.contains("redacted"));
    }
}
