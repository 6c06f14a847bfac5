//! The RTWire operation surface.
//!
//! [`RtwireClient`] lists every operation the service offers. `rtwire-http`
//! provides the `reqwest` implementation; tests can substitute their own.
//!
//! Each operation is one request and one response. Implementations hold no
//! mutable state, never retry, and never replace a transaction id on the
//! caller's behalf: a failed submission is retried by the caller with the
//! *same* id, which the service deduplicates.

use std::future::Future;

use crate::error::Error;
use crate::proto::{Account, AccountId, Fee, Hook, Transaction, TransactionId};
use crate::query::{ListOptions, Page};

/// Operations exposed by the RTWire API.
pub trait RtwireClient: Send + Sync {
    /// Creates a new account with a zero balance.
    fn create_account(&self) -> impl Future<Output = Result<Account, Error>> + Send;

    /// Fetches one account.
    fn account(&self, id: AccountId) -> impl Future<Output = Result<Account, Error>> + Send;

    /// Lists accounts. Only `limit` and `next` apply.
    fn accounts(
        &self,
        options: &ListOptions,
    ) -> impl Future<Output = Result<Page<Account>, Error>> + Send;

    /// Creates a deposit address bound to `account_id`.
    ///
    /// Funds sent to the address credit the account.
    fn create_address(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<String, Error>> + Send;

    /// Issues `n` fresh transaction ids, in service order.
    ///
    /// Persist an id before submitting a transfer or debit with it.
    fn create_transaction_ids(
        &self,
        n: u32,
    ) -> impl Future<Output = Result<Vec<TransactionId>, Error>> + Send;

    /// Fetches one transaction.
    fn transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<Transaction, Error>> + Send;

    /// Lists the transactions of one account. `limit`, `next` and `pending` apply.
    fn account_transactions(
        &self,
        account_id: AccountId,
        options: &ListOptions,
    ) -> impl Future<Output = Result<Page<Transaction>, Error>> + Send;

    /// Moves `value` satoshi between two accounts under `tx_id`.
    ///
    /// Fails with [`Error::InsufficientFunds`] or [`Error::TxIdUsed`].
    fn transfer(
        &self,
        tx_id: TransactionId,
        from: AccountId,
        to: AccountId,
        value: u64,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Sends `value` satoshi from an account to an external address under `tx_id`.
    ///
    /// Fails with [`Error::InsufficientFunds`] or [`Error::TxIdUsed`].
    fn debit(
        &self,
        tx_id: TransactionId,
        from: AccountId,
        to_address: &str,
        value: u64,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns current miner fee estimates.
    fn fees(&self) -> impl Future<Output = Result<Vec<Fee>, Error>> + Send;

    /// Registers a webhook. Fails with [`Error::HookExists`] on a duplicate URL.
    fn create_hook(&self, url: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Lists registered webhooks.
    fn hooks(&self) -> impl Future<Output = Result<Vec<Hook>, Error>> + Send;

    /// Removes a webhook.
    fn delete_hook(&self, url: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Rejects a zero issuance count before it reaches the service.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `n` is zero.
pub fn validate_issue_count(n: u32) -> Result<(), Error> {
    if n == 0 {
        return Err(Error::InvalidArgument(
            "at least one transaction id must be requested".to_owned(),
        ));
    }
    Ok(())
}

/// Rejects a zero amount before a transfer or debit is submitted.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `value` is zero.
pub fn validate_value(value: u64) -> Result<(), Error> {
    if value == 0 {
        return Err(Error::InvalidArgument("value must be positive".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_issue_count() {
        assert!(matches!(validate_issue_count(0), Err(Error::InvalidArgument(_))));
        assert!(validate_issue_count(1).is_ok());
    }

    #[test]
    fn test_validate_value() {
        assert!(matches!(validate_value(0), Err(Error::InvalidArgument(_))));
        assert!(validate_value(1).is_ok());
    }
}
