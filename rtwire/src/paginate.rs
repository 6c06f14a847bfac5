//! Cursor-driven streams over list endpoints.
//!
//! The streams are lazy: a request is made only when the consumer polls past
//! the items already fetched, and the stream ends after the page whose
//! cursor is empty. Dropping the stream stops paging.

use std::future::Future;

use futures_util::stream::{self, Stream, TryStreamExt};

use crate::client::RtwireClient;
use crate::error::Error;
use crate::proto::{Account, AccountId, Transaction};
use crate::query::{ListOptions, Page};

/// Streams every account, starting from `options`.
///
/// `options.limit` sets the page size.
pub fn accounts<C: RtwireClient>(
    client: &C,
    options: ListOptions,
) -> impl Stream<Item = Result<Account, Error>> + '_ {
    flatten(pages(options, move |opts: ListOptions| async move {
        client.accounts(&opts).await
    }))
}

/// Streams every transaction of `account_id`, starting from `options`.
pub fn account_transactions<C: RtwireClient>(
    client: &C,
    account_id: AccountId,
    options: ListOptions,
) -> impl Stream<Item = Result<Transaction, Error>> + '_ {
    flatten(pages(options, move |opts: ListOptions| async move {
        client.account_transactions(account_id, &opts).await
    }))
}

fn pages<'a, T, F, Fut>(
    options: ListOptions,
    mut fetch: F,
) -> impl Stream<Item = Result<Page<T>, Error>> + 'a
where
    T: 'a,
    F: FnMut(ListOptions) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, Error>> + 'a,
{
    stream::try_unfold(Some(options), move |state: Option<ListOptions>| {
        let request = state.map(|opts| {
            let fut = fetch(opts.clone());
            (opts, fut)
        });
        async move {
            let Some((opts, fut)) = request else {
                return Ok(None);
            };
            let page = fut.await?;
            let following = page.next.clone().map(|cursor| opts.next(Some(cursor)));
            Ok(Some((page, following)))
        }
    })
}

fn flatten<'a, T: 'a>(
    pages: impl Stream<Item = Result<Page<T>, Error>> + 'a,
) -> impl Stream<Item = Result<T, Error>> + 'a {
    pages
        .map_ok(|page| stream::iter(page.items.into_iter().map(Ok::<T, Error>)))
        .try_flatten()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::StreamExt;

    use super::*;
    use crate::proto::{Fee, Hook, TransactionId};
    use crate::query::Cursor;

    /// Serves a fixed account list, paging by index.
    struct FakeLedger {
        accounts: Vec<Account>,
        calls: AtomicUsize,
    }

    impl FakeLedger {
        fn with_accounts(n: i64) -> Self {
            Self {
                accounts: (1..=n)
                    .map(|id| Account {
                        id: AccountId::new(id),
                        balance: 0,
                    })
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    fn unsupported() -> Error {
        Error::InvalidArgument("unsupported by FakeLedger".into())
    }

    impl RtwireClient for FakeLedger {
        async fn create_account(&self) -> Result<Account, Error> {
            Err(unsupported())
        }

        async fn account(&self, _id: AccountId) -> Result<Account, Error> {
            Err(unsupported())
        }

        async fn accounts(&self, options: &ListOptions) -> Result<Page<Account>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start: usize = options
                .next
                .as_ref()
                .map_or(Ok(0), |c| c.as_str().parse())
                .map_err(|_| unsupported())?;
            let limit = options.limit.map_or(self.accounts.len(), |l| l as usize);
            let end = (start + limit).min(self.accounts.len());
            let next = if end < self.accounts.len() {
                Cursor::from_wire(end.to_string())
            } else {
                None
            };
            Ok(Page {
                next,
                items: self.accounts[start..end].to_vec(),
            })
        }

        async fn create_address(&self, _account_id: AccountId) -> Result<String, Error> {
            Err(unsupported())
        }

        async fn create_transaction_ids(&self, _n: u32) -> Result<Vec<TransactionId>, Error> {
            Err(unsupported())
        }

        async fn transaction(&self, _id: TransactionId) -> Result<Transaction, Error> {
            Err(unsupported())
        }

        async fn account_transactions(
            &self,
            _account_id: AccountId,
            _options: &ListOptions,
        ) -> Result<Page<Transaction>, Error> {
            Err(unsupported())
        }

        async fn transfer(
            &self,
            _tx_id: TransactionId,
            _from: AccountId,
            _to: AccountId,
            _value: u64,
        ) -> Result<(), Error> {
            Err(unsupported())
        }

        async fn debit(
            &self,
            _tx_id: TransactionId,
            _from: AccountId,
            _to_address: &str,
            _value: u64,
        ) -> Result<(), Error> {
            Err(unsupported())
        }

        async fn fees(&self) -> Result<Vec<Fee>, Error> {
            Err(unsupported())
        }

        async fn create_hook(&self, _url: &str) -> Result<(), Error> {
            Err(unsupported())
        }

        async fn hooks(&self) -> Result<Vec<Hook>, Error> {
            Err(unsupported())
        }

        async fn delete_hook(&self, _url: &str) -> Result<(), Error> {
            Err(unsupported())
        }
    }

    #[tokio::test]
    async fn test_accounts_stream_follows_cursor() {
        let ledger = FakeLedger::with_accounts(5);
        let all: Vec<Account> = accounts(&ledger, ListOptions::new().limit(2))
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<i64> = all.iter().map(|a| a.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_accounts_stream_is_lazy() {
        let ledger = FakeLedger::with_accounts(5);
        let first: Vec<_> = accounts(&ledger, ListOptions::new().limit(2))
            .take(1)
            .collect()
            .await;
        assert_eq!(first.len(), 1);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_stops_on_error() {
        let ledger = FakeLedger::with_accounts(3);
        let results: Vec<_> = account_transactions(&ledger, AccountId::new(1), ListOptions::new())
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::InvalidArgument(_))));
    }
}
