use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::chain::address::{Address, AddressCodec, Bech32Codec};
use crate::chain::error::{ClientError, Result};
use crate::chain::history::{TxFilter, TxPage};
use crate::chain::network::{Network, NetworkConfig, Prefix};
use crate::chain::rest_client::{ClientConfig, RestClient};
use crate::chain::tx_builder::{MsgSend, TxBuilder};
use crate::chain::types::{BroadcastResult, Coin, NormalTxParams, VaultTxParams};
use crate::chain::wallet::{self, KeyDerivation, PrivateKey, PublicKey, Secp256k1Keys, Secp256k1Signer, TransactionSigner};

/// Key material derived lazily from the phrase.
///
/// `set_phrase` moves to `Pending`; the first operation that needs the key
/// derives it and moves to `KeyComputed`. The key does not depend on the
/// network; the cached address is tagged with the prefix it was encoded under.
enum KeyState {
    NoPhrase,
    Pending {
        phrase: Zeroizing<String>,
        phrase_hash: [u8; 32],
    },
    KeyComputed {
        phrase_hash: [u8; 32],
        key: Arc<PrivateKey>,
        address: Option<(Prefix, Address)>,
    },
}

impl KeyState {
    fn phrase_hash(&self) -> Option<&[u8; 32]> {
        match self {
            KeyState::NoPhrase => None,
            KeyState::Pending { phrase_hash, .. } | KeyState::KeyComputed { phrase_hash, .. } => Some(phrase_hash),
        }
    }
}

/// Wallet client for one Thorchain network
pub struct ThorClient<K = Secp256k1Keys, S = Secp256k1Signer>
where
    K: KeyDerivation,
    S: TransactionSigner,
{
    network: Network,
    config: ClientConfig,
    http: reqwest::Client,
    keys: K,
    signer: S,
    codec: Bech32Codec,
    key_state: Mutex<KeyState>,
    // One lock per sender: fetch account -> sign -> broadcast must not interleave
    send_locks: Mutex<HashMap<Address, Arc<Mutex<()>>>>,
}

impl ThorClient {
    /// Create a client with default transport settings.
    pub fn new(network: Network, phrase: Option<&str>) -> Result<Self> {
        Self::with_config(ClientConfig::default(), network, phrase)
    }

    pub fn with_config(config: ClientConfig, network: Network, phrase: Option<&str>) -> Result<Self> {
        Self::with_components(config, network, phrase, Secp256k1Keys::new(), Secp256k1Signer::new())
    }

    pub fn validate_phrase(phrase: &str) -> bool {
        wallet::validate_phrase(phrase)
    }

    pub fn generate_phrase() -> Result<String> {
        wallet::generate_phrase()
    }
}

impl<K, S> ThorClient<K, S>
where
    K: KeyDerivation,
    S: TransactionSigner,
{
    /// Create a client with custom key derivation and signing.
    pub fn with_components(
        config: ClientConfig,
        network: Network,
        phrase: Option<&str>,
        keys: K,
        signer: S,
    ) -> Result<Self> {
        let http = config.http_client()?;
        let mut client = Self {
            network,
            config,
            http,
            keys,
            signer,
            codec: Bech32Codec,
            key_state: Mutex::new(KeyState::NoPhrase),
            send_locks: Mutex::new(HashMap::new()),
        };
        if let Some(phrase) = phrase {
            client.set_phrase(phrase)?;
        }
        Ok(client)
    }

    pub fn get_network(&self) -> Network {
        self.network
    }

    /// Switch networks. The key is kept; the address is re-encoded on demand.
    pub fn set_network(&mut self, network: Network) {
        if self.network != network {
            log::info!("Switching network {} -> {}", self.network, network);
            self.network = network;
        }
    }

    /// Everything network-dependent, recomputed on each call.
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::resolve(self.network, &self.config.endpoints)
    }

    pub fn get_client_url(&self) -> String {
        self.network_config().client_url
    }

    pub fn get_explorer_url(&self) -> String {
        self.network_config().explorer_url
    }

    pub fn get_explorer_address_url(&self, address: &str) -> String {
        self.network_config().explorer_address_url(address)
    }

    pub fn get_explorer_tx_url(&self, tx_hash: &str) -> String {
        self.network_config().explorer_tx_url(tx_hash)
    }

    pub fn get_prefix(&self) -> &'static str {
        self.network.prefix().as_str()
    }

    /// Replace the phrase. Setting the current phrase again keeps the cached key.
    pub fn set_phrase(&mut self, phrase: &str) -> Result<()> {
        let phrase_hash: [u8; 32] = Sha256::digest(phrase.as_bytes()).into();
        let state = self.key_state.get_mut();
        if state.phrase_hash() == Some(&phrase_hash) {
            return Ok(());
        }

        if !wallet::validate_phrase(phrase) {
            return Err(ClientError::InvalidMnemonic("phrase failed BIP39 validation".to_string()));
        }
        *state = KeyState::Pending {
            phrase: Zeroizing::new(phrase.to_string()),
            phrase_hash,
        };
        log::debug!("Phrase updated; key will be derived on next use");
        Ok(())
    }

    /// Address of the imported key on the current network, `None` without a phrase.
    ///
    /// Encoded once per prefix; a network switch re-encodes on the next call.
    pub async fn get_address(&self) -> Result<Option<Address>> {
        let Some(key) = self.private_key().await? else {
            return Ok(None);
        };
        let prefix = self.network.prefix();

        let mut state = self.key_state.lock().await;
        if let KeyState::KeyComputed {
            key: cached_key,
            address,
            ..
        } = &mut *state
        {
            if Arc::ptr_eq(cached_key, &key) {
                if let Some((cached_prefix, cached)) = address.as_ref() {
                    if *cached_prefix == prefix {
                        return Ok(Some(cached.clone()));
                    }
                }
                let derived = self.keys.derive_address(&key, prefix.as_str())?;
                *address = Some((prefix, derived.clone()));
                return Ok(Some(derived));
            }
        }
        Ok(Some(self.keys.derive_address(&key, prefix.as_str())?))
    }

    pub async fn get_public_key(&self) -> Result<Option<PublicKey>> {
        match self.private_key().await? {
            Some(key) => Ok(Some(key.public_key()?)),
            None => Ok(None),
        }
    }

    /// Valid bech32 under the current network's account prefix.
    pub fn validate_address(&self, address: &str) -> bool {
        self.codec.validate(address, self.get_prefix())
    }

    /// Balance of `address`, or of the imported key when omitted.
    ///
    /// Transport failures and unknown accounts yield `Ok(None)`; only a
    /// malformed explicit address or a missing phrase is an error.
    pub async fn get_balance(&self, address: Option<&str>) -> Result<Option<Vec<Coin>>> {
        let address = match address {
            Some(address) => {
                self.check_address(address)?;
                address.to_string()
            }
            None => self.get_address().await?.ok_or(ClientError::MissingFromAddress)?,
        };

        match self.rest().fetch_balance(&address).await {
            Ok(coins) => Ok(Some(coins)),
            Err(e) => {
                log::warn!("Balance unavailable for {}: {}", address, e);
                Ok(None)
            }
        }
    }

    /// Search transactions. `None` (or an empty filter) is an unconstrained query.
    pub async fn get_transactions(&self, filter: Option<TxFilter>) -> Result<Option<TxPage>> {
        let filter = filter.unwrap_or_default();
        if let Some(sender) = &filter.message_sender {
            self.check_address(sender)?;
        }
        if filter.is_unconstrained() {
            log::debug!("Searching transactions without filter");
        }

        match self.rest().search_transactions(&filter).await {
            Ok(page) => Ok(Some(page)),
            Err(e) => {
                log::warn!("Transaction search failed: {}", e);
                Ok(None)
            }
        }
    }

    /// Transfer with a memo (deposits, swaps). A blank memo is rejected
    /// before any request.
    pub async fn vault_tx(&self, params: VaultTxParams) -> Result<BroadcastResult> {
        if params.memo.trim().is_empty() {
            return Err(ClientError::MissingMemo);
        }
        self.transfer(
            params.address_from,
            &params.address_to,
            &params.amount,
            &params.asset,
            Some(&params.memo),
        )
        .await
    }

    /// Plain transfer without a memo.
    pub async fn normal_tx(&self, params: NormalTxParams) -> Result<BroadcastResult> {
        self.transfer(params.address_from, &params.address_to, &params.amount, &params.asset, None)
            .await
    }

    async fn transfer(
        &self,
        address_from: Option<Address>,
        address_to: &str,
        amount: &str,
        asset: &str,
        memo: Option<&str>,
    ) -> Result<BroadcastResult> {
        // All local validation happens before the first request
        let from = match address_from {
            Some(from) => from,
            None => self.get_address().await?.ok_or(ClientError::MissingFromAddress)?,
        };
        let key = self.private_key().await?.ok_or(ClientError::MissingPrivateKey)?;
        let coin = Coin::new(asset, amount)?;

        let network = self.network_config();
        let builder = TxBuilder::new(&network).with_gas_limit(self.config.gas_limit);
        let message = builder.build_send_message(&from, address_to, vec![coin])?;

        let lock = self.send_lock(&from).await;
        let result = {
            let _guard = lock.lock().await;
            let rest = RestClient::new(self.http.clone(), &network, self.config.max_retries);
            self.sign_and_broadcast(&rest, &builder, message, &from, &key, memo).await
        };
        self.release_send_lock(&from, lock).await;
        result
    }

    async fn sign_and_broadcast(
        &self,
        rest: &RestClient,
        builder: &TxBuilder,
        message: MsgSend,
        from: &str,
        key: &PrivateKey,
        memo: Option<&str>,
    ) -> Result<BroadcastResult> {
        let account = rest.fetch_account(from).await?;
        let unsigned = builder.build_unsigned_tx(message, &account, memo);
        let signed = self
            .signer
            .sign(unsigned, key, account.account_number, account.sequence)?;
        log::debug!(
            "Signed {} msg(s) with gas {} and memo {:?}",
            signed.msgs().len(),
            signed.fee().gas,
            signed.memo()
        );
        let result = rest.broadcast(&signed, self.config.broadcast_mode).await?;

        log::info!(
            "Broadcast {} from {} at sequence {}: code {}",
            result.tx_hash,
            from,
            account.sequence,
            result.code
        );
        Ok(result)
    }

    async fn private_key(&self) -> Result<Option<Arc<PrivateKey>>> {
        let (phrase, phrase_hash) = {
            let state = self.key_state.lock().await;
            match &*state {
                KeyState::NoPhrase => return Ok(None),
                KeyState::KeyComputed { key, .. } => return Ok(Some(Arc::clone(key))),
                KeyState::Pending { phrase, phrase_hash } => (phrase.clone(), *phrase_hash),
            }
        };

        // Seed stretching runs without the state lock held
        let key = Arc::new(self.keys.derive_private_key(&phrase)?);

        let mut state = self.key_state.lock().await;
        if let KeyState::KeyComputed {
            phrase_hash: cached_hash,
            key: cached,
            ..
        } = &*state
        {
            if *cached_hash == phrase_hash {
                return Ok(Some(Arc::clone(cached)));
            }
        }
        if state.phrase_hash() == Some(&phrase_hash) {
            *state = KeyState::KeyComputed {
                phrase_hash,
                key: Arc::clone(&key),
                address: None,
            };
        }
        Ok(Some(key))
    }

    async fn send_lock(&self, address: &str) -> Arc<Mutex<()>> {
        let mut locks = self.send_locks.lock().await;
        Arc::clone(locks.entry(address.to_string()).or_default())
    }

    /// Drop the map entry once no other send for `address` holds or waits on it.
    async fn release_send_lock(&self, address: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.send_locks.lock().await;
        // held by the map and by `lock` only
        if Arc::strong_count(&lock) == 2 {
            locks.remove(address);
        }
    }

    fn check_address(&self, address: &str) -> Result<()> {
        if self.validate_address(address) {
            Ok(())
        } else {
            Err(ClientError::InvalidAddress {
                address: address.to_string(),
                expected_prefix: self.get_prefix().to_string(),
            })
        }
    }

    fn rest(&self) -> RestClient {
        RestClient::new(self.http.clone(), &self.network_config(), self.config.max_retries)
    }
}
