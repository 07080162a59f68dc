/// Polymorphic account decoding for the legacy REST auth endpoint
///
/// `GET /auth/accounts/{address}` wraps the account in an amino envelope
/// `{"type": ..., "value": ...}`. Base accounts carry the fields directly;
/// module and vesting accounts embed them, either flattened or nested under
/// `base_account` / `base_vesting_account.base_account` depending on the
/// SDK version. Every known shape is reduced to the same `Account`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::chain::error::TransportError;
use crate::chain::types::{u64_from_string_or_number, Account, Coin};

#[derive(Debug, Clone, Deserialize)]
pub struct AccountEnvelope {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub value: Value,
}

/// Common account fields shared by every account type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BaseAccountFields {
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "coins_or_null")]
    pub coins: Vec<Coin>,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub account_number: u64,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    Base(BaseAccountFields),
    Module {
        base: BaseAccountFields,
        name: String,
    },
    Vesting {
        base: BaseAccountFields,
        type_name: String,
    },
    // Forward compatibility for unknown account types
    Unsupported {
        type_name: String,
    },
}

impl AccountKind {
    pub fn decode(envelope: &AccountEnvelope) -> Result<Self, TransportError> {
        let kind = match envelope.type_name.as_str() {
            "cosmos-sdk/Account" | "cosmos-sdk/BaseAccount" => AccountKind::Base(base_fields(&envelope.value)?),
            "cosmos-sdk/ModuleAccount" => AccountKind::Module {
                base: base_fields(&envelope.value)?,
                name: envelope
                    .value
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "cosmos-sdk/BaseVestingAccount"
            | "cosmos-sdk/ContinuousVestingAccount"
            | "cosmos-sdk/DelayedVestingAccount"
            | "cosmos-sdk/PeriodicVestingAccount"
            | "cosmos-sdk/PermanentLockedAccount" => AccountKind::Vesting {
                base: base_fields(&envelope.value)?,
                type_name: envelope.type_name.clone(),
            },
            unsupported => {
                log::warn!("Encountered unsupported account type: {}", unsupported);
                AccountKind::Unsupported {
                    type_name: unsupported.to_string(),
                }
            }
        };
        Ok(kind)
    }

    pub fn base(&self) -> Option<&BaseAccountFields> {
        match self {
            AccountKind::Base(base) => Some(base),
            AccountKind::Module { base, .. } | AccountKind::Vesting { base, .. } => Some(base),
            AccountKind::Unsupported { .. } => None,
        }
    }

    pub fn account_type(&self) -> &'static str {
        match self {
            AccountKind::Base(_) => "BaseAccount",
            AccountKind::Module { .. } => "ModuleAccount",
            AccountKind::Vesting { .. } => "VestingAccount",
            AccountKind::Unsupported { .. } => "UnsupportedAccount",
        }
    }

    /// `None` for unsupported types and for the empty record the server
    /// returns when the address has never been seen on chain.
    pub fn into_account(self) -> Option<Account> {
        let base = match self {
            AccountKind::Base(base) => base,
            AccountKind::Module { base, .. } | AccountKind::Vesting { base, .. } => base,
            AccountKind::Unsupported { .. } => return None,
        };
        if base.address.is_empty() {
            return None;
        }
        Some(Account {
            address: base.address,
            account_number: base.account_number,
            sequence: base.sequence,
            coins: base.coins,
        })
    }
}

/// Find the base fields at the top level or under one of the nesting keys.
fn base_fields(value: &Value) -> Result<BaseAccountFields, TransportError> {
    let nested = value
        .get("base_account")
        .or_else(|| value.get("base_vesting_account").and_then(|v| v.get("base_account")));

    let source = match nested {
        Some(inner) if value.get("address").is_none() => inner,
        _ => value,
    };
    BaseAccountFields::deserialize(source).map_err(|e| TransportError::Decode(format!("account fields: {}", e)))
}

fn coins_or_null<'de, D>(deserializer: D) -> Result<Vec<Coin>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Coin>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> AccountEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_base_account() {
        let env = envelope(json!({
            "type": "cosmos-sdk/Account",
            "value": {
                "address": "thor1vr2qu5a64tqq9m6mh3d0ghe8yxwzxhfqahkxwa",
                "coins": [{"denom": "rune", "amount": "2500000000"}],
                "public_key": null,
                "account_number": "42",
                "sequence": "7"
            }
        }));
        let kind = AccountKind::decode(&env).unwrap();
        assert_eq!(kind.account_type(), "BaseAccount");
        let account = kind.into_account().unwrap();
        assert_eq!(account.account_number, 42);
        assert_eq!(account.sequence, 7);
        assert_eq!(account.coins, vec![Coin::new("rune", "2500000000").unwrap()]);
    }

    #[test]
    fn test_nested_vesting_account() {
        let env = envelope(json!({
            "type": "cosmos-sdk/ContinuousVestingAccount",
            "value": {
                "base_vesting_account": {
                    "base_account": {
                        "address": "thor1vr2qu5a64tqq9m6mh3d0ghe8yxwzxhfqahkxwa",
                        "coins": null,
                        "account_number": 9,
                        "sequence": "1"
                    },
                    "original_vesting": []
                },
                "start_time": "0"
            }
        }));
        let account = AccountKind::decode(&env).unwrap().into_account().unwrap();
        assert_eq!(account.account_number, 9);
        assert_eq!(account.sequence, 1);
        assert!(account.coins.is_empty());
    }

    #[test]
    fn test_module_account() {
        let env = envelope(json!({
            "type": "cosmos-sdk/ModuleAccount",
            "value": {
                "base_account": {
                    "address": "thor1vr2qu5a64tqq9m6mh3d0ghe8yxwzxhfqahkxwa",
                    "account_number": "3",
                    "sequence": "0"
                },
                "name": "bond",
                "permissions": []
            }
        }));
        let kind = AccountKind::decode(&env).unwrap();
        assert!(matches!(&kind, AccountKind::Module { name, .. } if name == "bond"));
        assert_eq!(kind.base().unwrap().account_number, 3);
    }

    #[test]
    fn test_empty_record_is_not_an_account() {
        let env = envelope(json!({
            "type": "cosmos-sdk/Account",
            "value": {"address": "", "coins": [], "public_key": null, "account_number": "0", "sequence": "0"}
        }));
        assert!(AccountKind::decode(&env).unwrap().into_account().is_none());
    }

    #[test]
    fn test_unsupported_account() {
        let env = envelope(json!({"type": "thorchain/FancyAccount", "value": {}}));
        let kind = AccountKind::decode(&env).unwrap();
        assert_eq!(kind.account_type(), "UnsupportedAccount");
        assert!(kind.base().is_none());
        assert!(kind.into_account().is_none());
    }

    #[test]
    fn test_malformed_fields() {
        let env = envelope(json!({
            "type": "cosmos-sdk/Account",
            "value": {"address": "thor1x", "account_number": "not-a-number"}
        }));
        assert!(matches!(AccountKind::decode(&env), Err(TransportError::Decode(_))));
    }
}
