use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;

use crate::chain::account_types::{AccountEnvelope, AccountKind};
use crate::chain::error::{ClientError, Result, TransportError};
use crate::chain::history::{parse_tx_page, TxFilter, TxPage};
use crate::chain::network::{EndpointOverrides, NetworkConfig};
use crate::chain::tx_builder::{SignedTx, DEFAULT_GAS_LIMIT};
use crate::chain::types::{Account, BroadcastMode, BroadcastResult, Coin};

/// Runtime settings for the REST transport and transaction pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Maximum retry attempts for reads
    pub max_retries: u32,
    pub broadcast_mode: BroadcastMode,
    pub gas_limit: u64,
    pub endpoints: EndpointOverrides,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection_timeout: 10,
            request_timeout: 30,
            max_retries: 3,
            broadcast_mode: BroadcastMode::Sync,
            gas_limit: DEFAULT_GAS_LIMIT,
            endpoints: EndpointOverrides::default(),
        }
    }
}

impl ClientConfig {
    /// Shared HTTP client; every request inherits both timeouts.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout))
            .connect_timeout(Duration::from_secs(self.connection_timeout))
            .build()
            .map_err(|e| ClientError::Transport(TransportError::Http(e)))
    }
}

/// Thin client over the legacy Cosmos REST API of one network.
///
/// Cheap to build: it borrows the pooled `reqwest::Client` and is recreated
/// for every operation from the current `NetworkConfig`.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl RestClient {
    pub fn new(http: reqwest::Client, network: &NetworkConfig, max_retries: u32) -> Self {
        Self {
            http,
            base_url: network.client_url.clone(),
            max_retries,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /auth/accounts/{address}`, retried on transport failures.
    pub async fn fetch_account(&self, address: &str) -> Result<Account> {
        self.with_retry(|| self.fetch_account_once(address)).await
    }

    pub async fn fetch_balance(&self, address: &str) -> Result<Vec<Coin>> {
        Ok(self.fetch_account(address).await?.coins)
    }

    /// `GET /txs`. An unconstrained filter sends no query string at all.
    pub async fn search_transactions(&self, filter: &TxFilter) -> Result<TxPage> {
        let query = filter.query_pairs();
        let body = self.with_retry(|| self.get_json("/txs", &query)).await?;
        Ok(parse_tx_page(body)?)
    }

    /// `POST /txs`. Never retried: a resubmission could double-spend if the
    /// first attempt reached the mempool.
    pub async fn broadcast(&self, tx: &SignedTx, mode: BroadcastMode) -> Result<BroadcastResult> {
        let url = format!("{}/txs", self.base_url);
        let body = json!({
            "tx": tx,
            "mode": mode.as_str(),
        });

        log::debug!("Broadcasting tx to {} (mode={})", url, mode);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        let body = Self::read_json(response).await?;

        let result: BroadcastResult = serde_json::from_value(body)
            .map_err(|e| TransportError::Decode(format!("broadcast result: {}", e)))?;
        if !result.is_ok() {
            log::warn!("Chain rejected tx {} (code {}): {}", result.tx_hash, result.code, result.raw_log);
        }
        Ok(result)
    }

    async fn fetch_account_once(&self, address: &str) -> Result<Account> {
        let path = format!("/auth/accounts/{}", address);
        let body = match self.get_json(&path, &[]).await {
            Err(ClientError::Transport(TransportError::Status { status: 404, .. })) => {
                return Err(ClientError::AccountNotFound(address.to_string()));
            }
            other => other?,
        };

        // Newer servers wrap the record as {"height": .., "result": ..}
        let record = body.get("result").cloned().unwrap_or(body);
        if record.is_null() {
            return Err(ClientError::AccountNotFound(address.to_string()));
        }

        let envelope: AccountEnvelope = serde_json::from_value(record)
            .map_err(|e| TransportError::Decode(format!("account envelope: {}", e)))?;
        let kind = AccountKind::decode(&envelope)?;
        if let AccountKind::Unsupported { type_name } = &kind {
            return Err(TransportError::Decode(format!("unsupported account type {}", type_name)).into());
        }

        log::debug!(
            "Fetched {} for {} at sequence {:?}",
            kind.account_type(),
            address,
            kind.base().map(|base| base.sequence)
        );
        kind.into_account()
            .ok_or_else(|| ClientError::AccountNotFound(address.to_string()))
    }

    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(TransportError::from_reqwest)?;
        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::from_reqwest(e).into())
    }

    /// Retry helper for network reads
    async fn with_retry<T, F, Fut>(&self, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0;
        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    log::debug!("Retrying after error ({}/{}): {}", retries, self.max_retries, e);
                    tokio::time::sleep(Duration::from_millis(100 * retries as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::network::Network;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.broadcast_mode, BroadcastMode::Sync);
        assert_eq!(config.gas_limit, 200_000);
        assert!(config.http_client().is_ok());
    }

    #[test]
    fn test_base_url_follows_network() {
        let config = ClientConfig::default();
        let http = config.http_client().unwrap();
        let overrides = EndpointOverrides::default();

        let mainnet = RestClient::new(http.clone(), &NetworkConfig::resolve(Network::Mainnet, &overrides), 0);
        let testnet = RestClient::new(http, &NetworkConfig::resolve(Network::Testnet, &overrides), 0);
        assert_eq!(mainnet.base_url(), "http://13.250.144.124:1317");
        assert_eq!(testnet.base_url(), "http://168.119.22.92:1317");
    }
}
