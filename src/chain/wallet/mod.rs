mod keys;
mod signer;

pub use keys::{
    generate_phrase, validate_phrase, KeyDerivation, PrivateKey, PublicKey, Secp256k1Keys, THOR_HD_PATH,
};
pub use signer::{Secp256k1Signer, TransactionSigner};
