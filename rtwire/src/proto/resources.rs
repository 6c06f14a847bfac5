use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Identifier of an RTWire account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Wraps a raw account id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an RTWire transaction.
///
/// Ids are issued ahead of time by
/// [`RtwireClient::create_transaction_ids`](crate::RtwireClient::create_transaction_ids)
/// and consumed exactly once by a transfer or debit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    /// Wraps a raw transaction id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An RTWire account. Balances are in satoshi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id, non-zero once created.
    pub id: AccountId,
    /// Settled balance.
    pub balance: u64,
}

/// A deposit address bound to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// The address string.
    #[serde(alias = "Address")]
    pub address: String,
}

/// How a transaction came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Funds moved between two accounts.
    Transfer,
    /// Funds sent from an account to an external address.
    Debit,
    /// Funds deposited into an account from outside.
    Credit,
}

/// An RTWire transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction id.
    pub id: TransactionId,
    /// Transfer, debit or credit.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Sending account; zero for credits.
    #[serde(rename = "fromAccountID", default)]
    pub from_account_id: AccountId,
    /// Receiving account; zero for debits.
    #[serde(rename = "toAccountID", default)]
    pub to_account_id: AccountId,
    /// Balance of the sending account after this transaction.
    #[serde(default)]
    pub from_account_balance: u64,
    /// Balance of the receiving account after this transaction.
    #[serde(default)]
    pub to_account_balance: u64,
    /// Per-account sequence number on the sending side.
    #[serde(rename = "fromAccountTxID", default)]
    pub from_account_tx_id: i64,
    /// Per-account sequence number on the receiving side.
    #[serde(rename = "toAccountTxID", default)]
    pub to_account_tx_id: i64,
    /// Amount moved, in satoshi.
    pub value: u64,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// On-chain transaction hashes, oldest first.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub tx_hashes: Vec<String>,
    /// Output index within the on-chain transaction.
    #[serde(default)]
    pub tx_out_index: i64,
}

/// A freshly issued transaction id as returned by `POST /transactions/`.
///
/// Only the id is meaningful; any other fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTransaction {
    /// The issued id.
    pub id: TransactionId,
}

/// Settlement status of a [`TransactionEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    /// Credited to the account. Encoded as the empty string.
    #[default]
    #[serde(rename = "")]
    Settled,
    /// Observed but not yet confident enough to credit.
    #[serde(rename = "pending")]
    Pending,
}

/// A transaction pushed to a registered hook.
///
/// The same transaction may be delivered more than once, e.g. first as
/// pending and later as settled; match on [`Transaction::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Settlement status.
    #[serde(default)]
    pub status: EventStatus,
}

impl TransactionEvent {
    /// Returns `true` if the transaction has not been credited yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == EventStatus::Pending
    }
}

/// Estimated miner fee at a given block height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    /// Fee in satoshi per byte.
    pub fee_per_byte: u64,
    /// Block height the estimate applies to.
    pub block_height: u64,
}

/// A registered webhook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hook {
    /// Callback URL.
    pub url: String,
}

impl Hook {
    /// Creates a hook for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER_JSON: &str = r#"{
        "id": 7,
        "type": "transfer",
        "fromAccountID": 1,
        "toAccountID": 2,
        "fromAccountBalance": 5,
        "toAccountBalance": 5,
        "fromAccountTxID": 2,
        "toAccountTxID": 1,
        "value": 5,
        "created": "2017-05-01T10:00:00Z",
        "txHashes": null,
        "txOutIndex": 0
    }"#;

    #[test]
    fn test_transaction_deserialize_null_hashes() {
        let tx: Transaction = serde_json::from_str(TRANSFER_JSON).unwrap();
        assert_eq!(tx.id, TransactionId::new(7));
        assert_eq!(tx.kind, TransactionType::Transfer);
        assert_eq!(tx.from_account_id, AccountId::new(1));
        assert_eq!(tx.to_account_id, AccountId::new(2));
        assert_eq!(tx.from_account_tx_id, 2);
        assert!(tx.tx_hashes.is_empty());
    }

    #[test]
    fn test_transaction_serialize_field_names() {
        let tx: Transaction = serde_json::from_str(TRANSFER_JSON).unwrap();
        let value = serde_json::to_value(&tx).unwrap();
        for key in [
            "fromAccountID",
            "toAccountID",
            "fromAccountBalance",
            "toAccountBalance",
            "fromAccountTxID",
            "toAccountTxID",
            "txHashes",
            "txOutIndex",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["type"], "transfer");
    }

    #[test]
    fn test_credit_without_sender() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":3,"type":"credit","toAccountID":9,"value":10,
                "created":"2017-05-01T10:00:00Z","txHashes":["ab","cd"],"txOutIndex":1}"#,
        )
        .unwrap();
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.from_account_id, AccountId::default());
        assert_eq!(tx.tx_hashes, vec!["ab".to_owned(), "cd".to_owned()]);
    }

    #[test]
    fn test_event_status() {
        let mut value: serde_json::Value = serde_json::from_str(TRANSFER_JSON).unwrap();
        value["status"] = "pending".into();
        let event: TransactionEvent = serde_json::from_value(value.clone()).unwrap();
        assert!(event.is_pending());
        assert_eq!(event.transaction.id, TransactionId::new(7));

        value["status"] = "".into();
        let event: TransactionEvent = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(event.status, EventStatus::Settled);

        value.as_object_mut().unwrap().remove("status");
        let event: TransactionEvent = serde_json::from_value(value).unwrap();
        assert_eq!(event.status, EventStatus::Settled);
    }

    #[test]
    fn test_address_accepts_go_style_key() {
        let addr: Address = serde_json::from_str(r#"{"Address":"mzB1"}"#).unwrap();
        assert_eq!(addr.address, "mzB1");
    }
}
