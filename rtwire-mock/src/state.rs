//! In-memory ledger backing the mock service.
//!
//! All bookkeeping lives in [`Ledger`], which is synchronous and knows
//! nothing about HTTP. [`MockService`] wraps it in a mutex together with the
//! credentials and network the router serves.

use std::collections::{BTreeMap, HashMap, HashSet};

use base64::prelude::*;
use chrono::Utc;
use rtwire::proto::IssuedTransaction;
use rtwire::proto::requests::{DebitRequest, SubmitTransaction, TransferRequest};
use rtwire::{
    Account, AccountId, EventStatus, Fee, Hook, Network, Transaction, TransactionEvent,
    TransactionId, TransactionType,
};
use tokio::sync::Mutex;

use crate::error::MockError;

/// Page size used when a listing request carries no `limit`.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest number of transaction ids issued by one request.
pub const MAX_ISSUE_COUNT: u32 = 1000;

/// Basic-auth credentials accepted by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Checks the value of an `Authorization` header.
    #[must_use]
    pub fn accepts(&self, authorization: &str) -> bool {
        let Some(encoded) = authorization.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = BASE64_STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let expected = format!("{}:{}", self.user, self.password);
        decoded == expected.as_bytes()
    }
}

/// A mock RTWire deployment for one network.
#[derive(Debug)]
pub struct MockService {
    network: Network,
    credentials: Credentials,
    ledger: Mutex<Ledger>,
}

impl MockService {
    /// Creates an empty service.
    #[must_use]
    pub fn new(network: Network, credentials: Credentials) -> Self {
        Self {
            network,
            credentials,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// The network whose path prefix the router serves.
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network
    }

    /// The accepted credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Exclusive access to the ledger.
    pub async fn ledger(&self) -> tokio::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().await
    }
}

/// One page of a listing plus the cursor of the next one (empty if none).
pub type Listing<T> = (Vec<T>, String);

/// Accounts, addresses, transaction ids, transactions and hooks.
#[derive(Debug)]
pub struct Ledger {
    accounts: BTreeMap<AccountId, AccountBook>,
    addresses: HashMap<String, AccountId>,
    issued: HashSet<TransactionId>,
    consumed: HashSet<TransactionId>,
    transactions: Vec<TransactionEvent>,
    hooks: Vec<Hook>,
    fees: Vec<Fee>,
    last_account_id: i64,
    last_transaction_id: i64,
}

#[derive(Debug, Clone, Copy, Default)]
struct AccountBook {
    balance: u64,
    last_tx_seq: i64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            accounts: BTreeMap::new(),
            addresses: HashMap::new(),
            issued: HashSet::new(),
            consumed: HashSet::new(),
            transactions: Vec::new(),
            hooks: Vec::new(),
            fees: vec![
                Fee {
                    fee_per_byte: 120,
                    block_height: 1,
                },
                Fee {
                    fee_per_byte: 80,
                    block_height: 3,
                },
                Fee {
                    fee_per_byte: 40,
                    block_height: 6,
                },
            ],
            last_account_id: 0,
            last_transaction_id: 0,
        }
    }
}

impl Ledger {
    /// Opens a zero-balance account.
    pub fn create_account(&mut self) -> Account {
        self.last_account_id += 1;
        let id = AccountId::new(self.last_account_id);
        self.accounts.insert(id, AccountBook::default());
        Account { id, balance: 0 }
    }

    /// Looks up one account.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::AccountNotFound`].
    pub fn account(&self, id: AccountId) -> Result<Account, MockError> {
        self.accounts
            .get(&id)
            .map(|book| Account {
                id,
                balance: book.balance,
            })
            .ok_or(MockError::AccountNotFound)
    }

    /// Lists accounts in id order.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::InvalidCursor`] or [`MockError::InvalidValue`].
    pub fn accounts(
        &self,
        limit: Option<u32>,
        next: Option<&str>,
    ) -> Result<Listing<Account>, MockError> {
        let all: Vec<Account> = self
            .accounts
            .iter()
            .map(|(&id, book)| Account {
                id,
                balance: book.balance,
            })
            .collect();
        paginate(all, limit, next)
    }

    /// Binds a fresh deposit address to `account_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::AccountNotFound`].
    pub fn create_address(&mut self, account_id: AccountId) -> Result<String, MockError> {
        self.account(account_id)?;
        let address = format!("2Mock{:020}", self.addresses.len() + 1);
        self.addresses.insert(address.clone(), account_id);
        Ok(address)
    }

    /// Issues `n` unused transaction ids.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::InvalidValue`] unless `1 <= n <= MAX_ISSUE_COUNT`.
    pub fn issue_transaction_ids(&mut self, n: u32) -> Result<Vec<IssuedTransaction>, MockError> {
        if n == 0 || n > MAX_ISSUE_COUNT {
            return Err(MockError::InvalidValue);
        }
        Ok((0..n)
            .map(|_| {
                let id = self.next_transaction_id();
                self.issued.insert(id);
                IssuedTransaction { id }
            })
            .collect())
    }

    /// Looks up one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::TransactionNotFound`].
    pub fn transaction(&self, id: TransactionId) -> Result<Transaction, MockError> {
        self.transactions
            .iter()
            .find(|event| event.transaction.id == id)
            .map(|event| event.transaction.clone())
            .ok_or(MockError::TransactionNotFound)
    }

    /// Lists the transactions touching `account_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::AccountNotFound`], [`MockError::InvalidCursor`]
    /// or [`MockError::InvalidValue`].
    pub fn account_transactions(
        &self,
        account_id: AccountId,
        pending_only: bool,
        limit: Option<u32>,
        next: Option<&str>,
    ) -> Result<Listing<Transaction>, MockError> {
        self.account(account_id)?;
        let matching: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|event| {
                event.transaction.from_account_id == account_id
                    || event.transaction.to_account_id == account_id
            })
            .filter(|event| !pending_only || event.is_pending())
            .map(|event| event.transaction.clone())
            .collect();
        paginate(matching, limit, next)
    }

    /// Executes a transfer or debit, consuming its transaction id.
    ///
    /// Checks run in this order: id unused, id issued, value, accounts,
    /// balance. Nothing changes unless every check passes.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn submit(&mut self, request: &SubmitTransaction) -> Result<Transaction, MockError> {
        let id = request.id();
        if self.consumed.contains(&id) {
            return Err(MockError::TxIdUsed);
        }
        if !self.issued.contains(&id) {
            return Err(MockError::UnknownTransactionId);
        }

        let transaction = match request {
            SubmitTransaction::Transfer(transfer) => self.transfer(transfer)?,
            SubmitTransaction::Debit(debit) => self.debit(debit)?,
        };

        self.issued.remove(&id);
        self.consumed.insert(id);
        self.record(transaction.clone(), EventStatus::Settled);
        Ok(transaction)
    }

    /// Simulates funds arriving at a deposit address.
    ///
    /// A pending credit is listed but does not change the balance.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::AddressNotFound`] or [`MockError::InvalidValue`].
    pub fn deposit(
        &mut self,
        address: &str,
        value: u64,
        pending: bool,
    ) -> Result<TransactionEvent, MockError> {
        if value == 0 {
            return Err(MockError::InvalidValue);
        }
        let account_id = *self
            .addresses
            .get(address)
            .ok_or(MockError::AddressNotFound)?;
        let id = self.next_transaction_id();
        let book = self.book_mut(account_id)?;
        if !pending {
            book.balance = book.balance.checked_add(value).ok_or(MockError::InvalidValue)?;
        }
        book.last_tx_seq += 1;
        let (balance, seq) = (book.balance, book.last_tx_seq);

        let transaction = Transaction {
            id,
            kind: TransactionType::Credit,
            from_account_id: AccountId::default(),
            to_account_id: account_id,
            from_account_balance: 0,
            to_account_balance: balance,
            from_account_tx_id: 0,
            to_account_tx_id: seq,
            value,
            created: Utc::now(),
            tx_hashes: vec![fake_hash(id)],
            tx_out_index: 0,
        };
        let status = if pending {
            EventStatus::Pending
        } else {
            EventStatus::Settled
        };
        Ok(self.record(transaction, status))
    }

    /// Static fee estimates.
    #[must_use]
    pub fn fees(&self) -> Vec<Fee> {
        self.fees.clone()
    }

    /// Registers a hook.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::HookExists`] or [`MockError::InvalidValue`] for
    /// an empty URL.
    pub fn create_hook(&mut self, url: &str) -> Result<(), MockError> {
        if url.is_empty() {
            return Err(MockError::InvalidValue);
        }
        if self.hooks.iter().any(|hook| hook.url == url) {
            return Err(MockError::HookExists);
        }
        self.hooks.push(Hook::new(url));
        Ok(())
    }

    /// Registered hooks, in registration order.
    #[must_use]
    pub fn hooks(&self) -> Vec<Hook> {
        self.hooks.clone()
    }

    /// Removes the hook whose URL encodes to `hook_id`. Deleting a hook
    /// that is not registered succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::InvalidHookId`] if `hook_id` does not decode.
    pub fn delete_hook(&mut self, hook_id: &str) -> Result<(), MockError> {
        let url = BASE64_URL_SAFE
            .decode(hook_id)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(MockError::InvalidHookId)?;
        self.hooks.retain(|hook| hook.url != url);
        Ok(())
    }

    fn transfer(&mut self, request: &TransferRequest) -> Result<Transaction, MockError> {
        if request.value == 0 {
            return Err(MockError::InvalidValue);
        }
        let from = *self.book(request.from_account_id)?;
        self.book(request.to_account_id)?;
        if from.balance < request.value {
            return Err(MockError::InsufficientFunds);
        }

        let (from_balance, from_seq) =
            self.post(request.from_account_id, |b| b - request.value)?;
        let (to_balance, to_seq) =
            self.post(request.to_account_id, |b| b.saturating_add(request.value))?;

        Ok(Transaction {
            id: request.id,
            kind: TransactionType::Transfer,
            from_account_id: request.from_account_id,
            to_account_id: request.to_account_id,
            from_account_balance: from_balance,
            to_account_balance: to_balance,
            from_account_tx_id: from_seq,
            to_account_tx_id: to_seq,
            value: request.value,
            created: Utc::now(),
            tx_hashes: Vec::new(),
            tx_out_index: 0,
        })
    }

    fn debit(&mut self, request: &DebitRequest) -> Result<Transaction, MockError> {
        if request.value == 0 || request.to_address.is_empty() {
            return Err(MockError::InvalidValue);
        }
        let from = *self.book(request.from_account_id)?;
        if from.balance < request.value {
            return Err(MockError::InsufficientFunds);
        }
        let (from_balance, from_seq) =
            self.post(request.from_account_id, |b| b - request.value)?;

        Ok(Transaction {
            id: request.id,
            kind: TransactionType::Debit,
            from_account_id: request.from_account_id,
            to_account_id: AccountId::default(),
            from_account_balance: from_balance,
            to_account_balance: 0,
            from_account_tx_id: from_seq,
            to_account_tx_id: 0,
            value: request.value,
            created: Utc::now(),
            tx_hashes: vec![fake_hash(request.id)],
            tx_out_index: 0,
        })
    }

    /// Applies `update` to an account balance and bumps its sequence number.
    fn post(
        &mut self,
        account_id: AccountId,
        update: impl FnOnce(u64) -> u64,
    ) -> Result<(u64, i64), MockError> {
        let book = self.book_mut(account_id)?;
        book.balance = update(book.balance);
        book.last_tx_seq += 1;
        Ok((book.balance, book.last_tx_seq))
    }

    fn record(&mut self, transaction: Transaction, status: EventStatus) -> TransactionEvent {
        tracing::debug!(
            id = %transaction.id,
            kind = ?transaction.kind,
            value = transaction.value,
            ?status,
            "recorded transaction"
        );
        let event = TransactionEvent {
            transaction,
            status,
        };
        self.transactions.push(event.clone());
        event
    }

    fn book(&self, id: AccountId) -> Result<&AccountBook, MockError> {
        self.accounts.get(&id).ok_or(MockError::AccountNotFound)
    }

    fn book_mut(&mut self, id: AccountId) -> Result<&mut AccountBook, MockError> {
        self.accounts.get_mut(&id).ok_or(MockError::AccountNotFound)
    }

    fn next_transaction_id(&mut self) -> TransactionId {
        self.last_transaction_id += 1;
        TransactionId::new(self.last_transaction_id)
    }
}

/// Cuts one page out of `items`. Cursors are opaque encodings of an offset.
fn paginate<T>(
    items: Vec<T>,
    limit: Option<u32>,
    next: Option<&str>,
) -> Result<Listing<T>, MockError> {
    let start = match next {
        None | Some("") => 0,
        Some(cursor) => decode_cursor(cursor).ok_or(MockError::InvalidCursor)?,
    };
    let limit = match limit {
        Some(0) => return Err(MockError::InvalidValue),
        Some(n) => usize::try_from(n).map_err(|_| MockError::InvalidValue)?,
        None => DEFAULT_PAGE_SIZE,
    };
    if start > items.len() {
        return Err(MockError::InvalidCursor);
    }

    let end = start.saturating_add(limit).min(items.len());
    let next = if end < items.len() {
        encode_cursor(end)
    } else {
        String::new()
    };
    let page = items.into_iter().skip(start).take(end - start).collect();
    Ok((page, next))
}

fn encode_cursor(offset: usize) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(format!("offset:{offset}"))
}

fn decode_cursor(cursor: &str) -> Option<usize> {
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(cursor).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix("offset:")?.parse().ok()
}

fn fake_hash(id: TransactionId) -> String {
    format!("{:064x}", id.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(ledger: &mut Ledger, value: u64) -> AccountId {
        let account = ledger.create_account();
        let address = ledger.create_address(account.id).unwrap();
        ledger.deposit(&address, value, false).unwrap();
        account.id
    }

    fn transfer(id: TransactionId, from: AccountId, to: AccountId, value: u64) -> SubmitTransaction {
        SubmitTransaction::Transfer(TransferRequest {
            id,
            from_account_id: from,
            to_account_id: to,
            value,
        })
    }

    #[test]
    fn test_credentials() {
        let creds = Credentials::new("user", "pass");
        // base64("user:pass")
        assert!(creds.accepts("Basic dXNlcjpwYXNz"));
        assert!(!creds.accepts("Basic dXNlcjp3cm9uZw=="));
        assert!(!creds.accepts("Bearer dXNlcjpwYXNz"));
        assert!(!creds.accepts("Basic !!!"));
    }

    #[test]
    fn test_accounts_start_empty() {
        let mut ledger = Ledger::default();
        let a = ledger.create_account();
        let b = ledger.create_account();
        assert_ne!(a.id, b.id);
        assert_eq!(ledger.account(a.id).unwrap().balance, 0);
        assert!(matches!(
            ledger.account(AccountId::new(99)),
            Err(MockError::AccountNotFound)
        ));
    }

    #[test]
    fn test_pagination_cursors() {
        let mut ledger = Ledger::default();
        for _ in 0..5 {
            ledger.create_account();
        }
        let (first, next) = ledger.accounts(Some(2), None).unwrap();
        assert_eq!(first.len(), 2);
        assert!(!next.is_empty());
        let (second, next) = ledger.accounts(Some(2), Some(&next)).unwrap();
        assert_eq!(second[0].id, AccountId::new(3));
        let (third, next) = ledger.accounts(Some(2), Some(&next)).unwrap();
        assert_eq!(third.len(), 1);
        assert!(next.is_empty());

        assert!(matches!(
            ledger.accounts(None, Some("bogus")),
            Err(MockError::InvalidCursor)
        ));
    }

    #[test]
    fn test_transfer_consumes_id_once() {
        let mut ledger = Ledger::default();
        let a = funded(&mut ledger, 10);
        let b = ledger.create_account().id;
        let id = ledger.issue_transaction_ids(1).unwrap()[0].id;

        ledger.submit(&transfer(id, a, b, 5)).unwrap();
        assert!(matches!(
            ledger.submit(&transfer(id, a, b, 5)),
            Err(MockError::TxIdUsed)
        ));
        assert_eq!(ledger.account(a).unwrap().balance, 5);
        assert_eq!(ledger.account(b).unwrap().balance, 5);
    }

    #[test]
    fn test_failed_transfer_keeps_id_and_balances() {
        let mut ledger = Ledger::default();
        let a = funded(&mut ledger, 10);
        let b = ledger.create_account().id;
        let id = ledger.issue_transaction_ids(1).unwrap()[0].id;

        assert!(matches!(
            ledger.submit(&transfer(id, a, b, 11)),
            Err(MockError::InsufficientFunds)
        ));
        assert_eq!(ledger.account(a).unwrap().balance, 10);

        ledger.submit(&transfer(id, a, b, 10)).unwrap();
        assert_eq!(ledger.account(b).unwrap().balance, 10);
    }

    #[test]
    fn test_unissued_id_rejected() {
        let mut ledger = Ledger::default();
        let a = funded(&mut ledger, 10);
        let b = ledger.create_account().id;
        assert!(matches!(
            ledger.submit(&transfer(TransactionId::new(500), a, b, 1)),
            Err(MockError::UnknownTransactionId)
        ));
    }

    #[test]
    fn test_debit_records_hash() {
        let mut ledger = Ledger::default();
        let a = funded(&mut ledger, 10);
        let id = ledger.issue_transaction_ids(1).unwrap()[0].id;
        let debit = SubmitTransaction::Debit(DebitRequest {
            id,
            from_account_id: a,
            to_address: "mzB1".to_owned(),
            value: 4,
        });
        let tx = ledger.submit(&debit).unwrap();
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.from_account_balance, 6);
        assert_eq!(tx.tx_hashes.len(), 1);
    }

    #[test]
    fn test_pending_deposit_is_listed_not_credited() {
        let mut ledger = Ledger::default();
        let account = ledger.create_account();
        let address = ledger.create_address(account.id).unwrap();
        let event = ledger.deposit(&address, 7, true).unwrap();
        assert!(event.is_pending());
        assert_eq!(ledger.account(account.id).unwrap().balance, 0);

        let (pending, _) = ledger
            .account_transactions(account.id, true, None, None)
            .unwrap();
        assert_eq!(pending.len(), 1);

        ledger.deposit(&address, 3, false).unwrap();
        let (all, _) = ledger
            .account_transactions(account.id, false, None, None)
            .unwrap();
        assert_eq!(all.len(), 2);
        let (pending, _) = ledger
            .account_transactions(account.id, true, None, None)
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_issue_bounds() {
        let mut ledger = Ledger::default();
        assert!(matches!(
            ledger.issue_transaction_ids(0),
            Err(MockError::InvalidValue)
        ));
        let ids = ledger.issue_transaction_ids(3).unwrap();
        let unique: HashSet<_> = ids.iter().map(|tx| tx.id).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_hooks() {
        let mut ledger = Ledger::default();
        ledger.create_hook("https://a/hook").unwrap();
        assert!(matches!(
            ledger.create_hook("https://a/hook"),
            Err(MockError::HookExists)
        ));
        let id = BASE64_URL_SAFE.encode("https://a/hook");
        ledger.delete_hook(&id).unwrap();
        assert!(ledger.hooks().is_empty());
        ledger.delete_hook(&id).unwrap();
        assert!(matches!(
            ledger.delete_hook("%%%"),
            Err(MockError::InvalidHookId)
        ));
    }
}
