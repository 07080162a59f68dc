pub mod account_types;
pub mod address;
pub mod client;
pub mod error;
pub mod history;
pub mod network;
pub mod rest_client;
pub mod tx_builder;
pub mod types;
pub mod wallet;

pub use address::{Address, AddressCodec, Bech32Codec};
pub use client::ThorClient;
pub use error::{ClientError, Result, TransportError};
pub use history::{TxFilter, TxPage, TxRecord, TxResult, TX_SCHEMA_VERSION};
pub use network::{EndpointOverrides, Network, NetworkConfig, Prefix, PrefixFamily};
pub use rest_client::{ClientConfig, RestClient};
pub use tx_builder::{SignedTx, TxBuilder, UnsignedTx};
pub use types::{Account, BroadcastMode, BroadcastResult, Coin, NormalTxParams, VaultTxParams};
pub use wallet::{KeyDerivation, PrivateKey, PublicKey, Secp256k1Keys, Secp256k1Signer, TransactionSigner};
