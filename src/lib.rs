// Library exports for thorchain_client

pub mod chain;
pub mod config;

// Re-export main types for convenience
pub use chain::{
    Address, BroadcastMode, BroadcastResult, ClientConfig, ClientError, Coin, Network, NormalTxParams, ThorClient,
    TxFilter, TxPage, VaultTxParams,
};
pub use config::Config;
