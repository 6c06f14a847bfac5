//! Request bodies sent to the service.

use serde::{Deserialize, Serialize};

use super::{AccountId, TransactionId};

/// Body of `POST /transactions/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTransactionIds {
    /// Number of ids to issue.
    pub n: u32,
}

/// Body of `PUT /transactions/` moving funds between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// A previously issued, unused transaction id.
    pub id: TransactionId,
    /// Sending account.
    #[serde(rename = "fromAccountID")]
    pub from_account_id: AccountId,
    /// Receiving account.
    #[serde(rename = "toAccountID")]
    pub to_account_id: AccountId,
    /// Amount in satoshi.
    pub value: u64,
}

/// Body of `PUT /transactions/` sending funds to an external address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitRequest {
    /// A previously issued, unused transaction id.
    pub id: TransactionId,
    /// Sending account.
    #[serde(rename = "fromAccountID")]
    pub from_account_id: AccountId,
    /// Destination address.
    pub to_address: String,
    /// Amount in satoshi.
    pub value: u64,
}

/// Body of `PUT /transactions/`, either shape.
///
/// Untagged: a body carrying `toAccountID` is a transfer, one carrying
/// `toAddress` is a debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitTransaction {
    /// Internal transfer.
    Transfer(TransferRequest),
    /// External debit.
    Debit(DebitRequest),
}

impl SubmitTransaction {
    /// The transaction id this submission consumes.
    #[must_use]
    pub const fn id(&self) -> TransactionId {
        match self {
            Self::Transfer(t) => t.id,
            Self::Debit(d) => d.id,
        }
    }
}

/// Body of `POST /hooks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHookRequest {
    /// Callback URL to register.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_wire_shape() {
        let req = TransferRequest {
            id: TransactionId::new(4),
            from_account_id: AccountId::new(1),
            to_account_id: AccountId::new(2),
            value: 5,
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            serde_json::json!({"id": 4, "fromAccountID": 1, "toAccountID": 2, "value": 5})
        );
    }

    #[test]
    fn test_submit_distinguishes_shapes() {
        let transfer: SubmitTransaction = serde_json::from_str(
            r#"{"id":4,"fromAccountID":1,"toAccountID":2,"value":5}"#,
        )
        .unwrap();
        assert!(matches!(transfer, SubmitTransaction::Transfer(_)));

        let debit: SubmitTransaction = serde_json::from_str(
            r#"{"id":5,"fromAccountID":1,"toAddress":"mzB1","value":5}"#,
        )
        .unwrap();
        assert!(matches!(debit, SubmitTransaction::Debit(ref d) if d.to_address == "mzB1"));
        assert_eq!(debit.id(), TransactionId::new(5));
    }
}
