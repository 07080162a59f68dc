/// Transaction search: filter encoding and response reshaping
///
/// The reshaping maps backend field names (`txhash`, `raw_log`, `logs`, ...)
/// onto a local schema. The backend does not promise those names, so the
/// local schema carries its own version number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::error::TransportError;
use crate::chain::types::u64_from_string_or_number;

pub const TX_SCHEMA_VERSION: u32 = 1;

/// Search filter. Every field is optional; `None` leaves that dimension
/// unconstrained and sends nothing for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxFilter {
    pub message_action: Option<String>,
    pub message_sender: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub tx_min_height: Option<u64>,
    pub tx_max_height: Option<u64>,
}

impl TxFilter {
    pub fn is_unconstrained(&self) -> bool {
        self == &TxFilter::default()
    }

    /// Query parameters for the `/txs` endpoint, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(action) = &self.message_action {
            pairs.push(("message.action", action.clone()));
        }
        if let Some(sender) = &self.message_sender {
            pairs.push(("message.sender", sender.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(min) = self.tx_min_height {
            pairs.push(("tx.minheight", min.to_string()));
        }
        if let Some(max) = self.tx_max_height {
            pairs.push(("tx.maxheight", max.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Deserialize)]
struct RawTxPage {
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    total_count: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    count: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    page_number: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    page_total: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    limit: u64,
    #[serde(default)]
    txs: Option<Vec<RawTxResponse>>,
}

#[derive(Debug, Deserialize)]
struct RawTxResponse {
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    height: u64,
    #[serde(default)]
    txhash: String,
    #[serde(default)]
    raw_log: String,
    #[serde(default)]
    logs: Value,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    gas_wanted: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    gas_used: u64,
    #[serde(default)]
    tx: Value,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxPage {
    pub schema_version: u32,
    pub total_count: u64,
    pub count: u64,
    pub page_number: u64,
    pub page_total: u64,
    pub limit: u64,
    pub txs: Vec<TxRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxRecord {
    pub hash: String,
    pub height: u64,
    #[serde(rename = "tx")]
    pub raw_tx: Value,
    pub timestamp: Option<DateTime<Utc>>,
    pub result: TxResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxResult {
    pub log: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub tags: Value,
}

impl From<RawTxResponse> for TxRecord {
    fn from(raw: RawTxResponse) -> Self {
        let timestamp = raw.timestamp.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| log::debug!("Ignoring unparseable tx timestamp {}: {}", ts, e))
                .ok()
        });
        Self {
            hash: raw.txhash,
            height: raw.height,
            raw_tx: raw.tx,
            timestamp,
            result: TxResult {
                log: raw.raw_log,
                gas_wanted: raw.gas_wanted,
                gas_used: raw.gas_used,
                tags: raw.logs,
            },
        }
    }
}

/// Reshape a `/txs` body. Backend ordering is kept as-is.
pub fn parse_tx_page(body: Value) -> Result<TxPage, TransportError> {
    let raw: RawTxPage =
        serde_json::from_value(body).map_err(|e| TransportError::Decode(format!("tx search page: {}", e)))?;

    Ok(TxPage {
        schema_version: TX_SCHEMA_VERSION,
        total_count: raw.total_count,
        count: raw.count,
        page_number: raw.page_number,
        page_total: raw.page_total,
        limit: raw.limit,
        txs: raw.txs.unwrap_or_default().into_iter().map(TxRecord::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_sends_nothing() {
        let filter = TxFilter::default();
        assert!(filter.is_unconstrained());
        assert!(filter.query_pairs().is_empty());
    }

    #[test]
    fn test_filter_pairs() {
        let filter = TxFilter {
            message_sender: Some("thor1v8ppstuf6e3x0r4glqc68d5jqcs2tf38cg2q6y".to_string()),
            page: Some(2),
            tx_max_height: Some(5000),
            ..Default::default()
        };
        assert!(!filter.is_unconstrained());
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("message.sender", "thor1v8ppstuf6e3x0r4glqc68d5jqcs2tf38cg2q6y".to_string()),
                ("page", "2".to_string()),
                ("tx.maxheight", "5000".to_string()),
            ]
        );
    }

    #[test]
    fn test_reshape_preserves_order() {
        let body = json!({
            "total_count": "2",
            "count": "2",
            "page_number": "1",
            "page_total": "1",
            "limit": "30",
            "txs": [
                {
                    "height": "900",
                    "txhash": "BBBB",
                    "raw_log": "[]",
                    "logs": [{"msg_index": 0, "success": true}],
                    "gas_wanted": "200000",
                    "gas_used": "61234",
                    "tx": {"type": "cosmos-sdk/StdTx"},
                    "timestamp": "2020-09-01T10:00:00Z"
                },
                {
                    "height": "12",
                    "txhash": "AAAA",
                    "raw_log": "out of gas",
                    "gas_wanted": "1",
                    "gas_used": "2"
                }
            ]
        });
        let page = parse_tx_page(body).unwrap();
        assert_eq!(page.schema_version, TX_SCHEMA_VERSION);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.limit, 30);
        let hashes: Vec<&str> = page.txs.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["BBBB", "AAAA"]);

        let first = &page.txs[0];
        assert_eq!(first.height, 900);
        assert_eq!(first.result.gas_used, 61234);
        assert_eq!(first.result.tags[0]["success"], true);
        assert_eq!(first.raw_tx["type"], "cosmos-sdk/StdTx");
        assert!(first.timestamp.is_some());

        let second = &page.txs[1];
        assert_eq!(second.result.log, "out of gas");
        assert!(second.result.tags.is_null());
        assert!(second.timestamp.is_none());
    }

    #[test]
    fn test_null_txs() {
        let page = parse_tx_page(json!({"total_count": "0", "count": "0", "txs": null})).unwrap();
        assert!(page.txs.is_empty());
    }

    #[test]
    fn test_malformed_page() {
        assert!(matches!(
            parse_tx_page(json!({"total_count": "many"})),
            Err(TransportError::Decode(_))
        ));
    }
}
