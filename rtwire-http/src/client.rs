//! `reqwest`-based RTWire client.
//!
//! [`HttpClient`] implements [`RtwireClient`] by making one authenticated
//! HTTP call per operation and running the response through
//! [`rtwire::codec`].
//!
//! ## Features
//!
//! - Basic authentication and JSON bodies on every request
//! - Optional request timeout and pre-built `reqwest::Client`
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! The client never retries. Transfers and debits are made safe to retry
//! by the caller through pre-issued transaction ids, which the client passes
//! through unchanged.

use std::fmt;
use std::time::Duration;

use base64::prelude::*;
use http::Method;
use http::header::ACCEPT;
use reqwest::RequestBuilder;
use rtwire::client::{validate_issue_count, validate_value};
use rtwire::codec::{self, Decoded};
use rtwire::network::MAINNET_URL;
use rtwire::proto::requests::{
    CreateHookRequest, DebitRequest, IssueTransactionIds, TransferRequest,
};
use rtwire::proto::{Address, IssuedTransaction};
use rtwire::{
    Account, AccountId, Error, Fee, Hook, ListOptions, Network, Page, RtwireClient,
    ServiceErrorKind, Transaction, TransactionId,
};
use serde::Serialize;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::constants::{
    ACCOUNTS_PATH, DEFAULT_TIMEOUT, FEES_PATH, HOOKS_PATH, JSON_CONTENT_TYPE, TRANSACTIONS_PATH,
};

/// Conditions a transfer or debit caller can branch on.
const SUBMIT_ERRORS: [ServiceErrorKind; 2] =
    [ServiceErrorKind::InsufficientFunds, ServiceErrorKind::TxIdUsed];

/// Configuration for [`HttpClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Network base URL, e.g. [`MAINNET_URL`].
    pub url: String,

    /// Basic-auth user name.
    pub user: String,

    /// Basic-auth password.
    pub password: String,

    /// Request timeout, applied when the client builds its own `reqwest::Client`.
    pub timeout: Duration,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout.
    pub http_client: Option<reqwest::Client>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: MAINNET_URL.to_owned(),
            user: String::new(),
            password: String::new(),
            timeout: DEFAULT_TIMEOUT,
            http_client: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given base URL and credentials.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Creates a config for a production network.
    #[must_use]
    pub fn for_network(
        network: Network,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(network.default_url(), user, password)
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("has_http_client", &self.http_client.is_some())
            .finish()
    }
}

/// Async HTTP client for the RTWire API.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use rtwire::{Network, RtwireClient};
/// use rtwire_http::{ClientConfig, HttpClient};
///
/// # async fn run() -> Result<(), rtwire::Error> {
/// let client = HttpClient::new(ClientConfig::for_network(Network::Testnet3, "user", "pass"))?;
/// let account = client.create_account().await?;
/// let address = client.create_address(account.id).await?;
/// println!("deposit to {address}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    base_url: Url,
    user: String,
    password: String,
    client: reqwest::Client,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL cannot be parsed, or
    /// [`Error::Transport`] if the `reqwest` client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        // Normalize to a single trailing slash so relative joins stay under the network path.
        let mut normalized = config.url.trim_end_matches('/').to_owned();
        normalized.push('/');
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.url)))?;

        let client = match config.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|e| Error::transport("build reqwest client", e))?,
        };

        Ok(Self {
            base_url,
            user: config.user,
            password: config.password,
            client,
        })
    }

    /// Returns the network base URL, with a trailing slash.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /accounts/`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cardinality`] unless exactly one account comes back.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.create_account", skip_all, err)
    )]
    pub async fn create_account(&self) -> Result<Account, Error> {
        let url = self.endpoint(ACCOUNTS_PATH)?;
        self.send(Method::POST, url).await?.one("account")
    }

    /// `GET /accounts/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cardinality`] unless exactly one account comes back.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.account", skip(self), err)
    )]
    pub async fn account(&self, id: AccountId) -> Result<Account, Error> {
        let url = self.endpoint(&format!("{ACCOUNTS_PATH}{id}"))?;
        self.send(Method::GET, url).await?.one("account")
    }

    /// `GET /accounts/?limit=&next=`
    ///
    /// `options.pending` has no meaning for accounts and is not sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not a list of accounts.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.accounts", skip(self), err)
    )]
    pub async fn accounts(&self, options: &ListOptions) -> Result<Page<Account>, Error> {
        let mut url = self.endpoint(ACCOUNTS_PATH)?;
        set_query(&mut url, &options.page_pairs());
        self.send(Method::GET, url).await?.into_page()
    }

    /// `POST /accounts/{id}/addresses/`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cardinality`] unless exactly one address comes back.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.create_address", skip(self), err)
    )]
    pub async fn create_address(&self, account_id: AccountId) -> Result<String, Error> {
        let url = self.endpoint(&format!("{ACCOUNTS_PATH}{account_id}/addresses/"))?;
        let address: Address = self.send(Method::POST, url).await?.one("address")?;
        Ok(address.address)
    }

    /// `POST /transactions/` with `{"n": n}`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `n == 0` (nothing is sent) and
    /// [`Error::Cardinality`] unless exactly `n` ids come back.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.create_transaction_ids", skip(self), err)
    )]
    pub async fn create_transaction_ids(&self, n: u32) -> Result<Vec<TransactionId>, Error> {
        validate_issue_count(n)?;
        let url = self.endpoint(TRANSACTIONS_PATH)?;
        let expected = usize::try_from(n).map_err(|e| Error::InvalidArgument(e.to_string()))?;
        let issued: Vec<IssuedTransaction> = self
            .send_json(Method::POST, url, &IssueTransactionIds { n })
            .await?
            .exactly("transaction id", expected)?;
        Ok(issued.into_iter().map(|tx| tx.id).collect())
    }

    /// `GET /transactions/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cardinality`] if the transaction is not found.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.transaction", skip(self), err)
    )]
    pub async fn transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        let url = self.endpoint(&format!("{TRANSACTIONS_PATH}{id}"))?;
        self.send(Method::GET, url).await?.one("transaction")
    }

    /// `GET /accounts/{id}/transactions/?limit=&next=&status=pending`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not a list of transactions.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.account_transactions", skip(self), err)
    )]
    pub async fn account_transactions(
        &self,
        account_id: AccountId,
        options: &ListOptions,
    ) -> Result<Page<Transaction>, Error> {
        let mut url = self.endpoint(&format!("{ACCOUNTS_PATH}{account_id}/transactions/"))?;
        set_query(&mut url, &options.query_pairs());
        self.send(Method::GET, url).await?.into_page()
    }

    /// `PUT /transactions/` with a transfer body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientFunds`], [`Error::TxIdUsed`], or
    /// [`Error::InvalidArgument`] for a zero value (nothing is sent).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.transfer", skip(self), err)
    )]
    pub async fn transfer(
        &self,
        tx_id: TransactionId,
        from: AccountId,
        to: AccountId,
        value: u64,
    ) -> Result<(), Error> {
        validate_value(value)?;
        let url = self.endpoint(TRANSACTIONS_PATH)?;
        let body = TransferRequest {
            id: tx_id,
            from_account_id: from,
            to_account_id: to,
            value,
        };
        self.send_json(Method::PUT, url, &body)
            .await
            .map_err(|e| e.elevate(&SUBMIT_ERRORS))?;
        Ok(())
    }

    /// `PUT /transactions/` with a debit body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientFunds`], [`Error::TxIdUsed`], or
    /// [`Error::InvalidArgument`] for a zero value (nothing is sent).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.debit", skip(self), err)
    )]
    pub async fn debit(
        &self,
        tx_id: TransactionId,
        from: AccountId,
        to_address: &str,
        value: u64,
    ) -> Result<(), Error> {
        validate_value(value)?;
        let url = self.endpoint(TRANSACTIONS_PATH)?;
        let body = DebitRequest {
            id: tx_id,
            from_account_id: from,
            to_address: to_address.to_owned(),
            value,
        };
        self.send_json(Method::PUT, url, &body)
            .await
            .map_err(|e| e.elevate(&SUBMIT_ERRORS))?;
        Ok(())
    }

    /// `GET /fees/`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not a list of fees.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.fees", skip_all, err)
    )]
    pub async fn fees(&self) -> Result<Vec<Fee>, Error> {
        let url = self.endpoint(FEES_PATH)?;
        self.send(Method::GET, url).await?.decode_list()
    }

    /// `POST /hooks/`
    ///
    /// # Errors
    ///
    /// Returns [`Error::HookExists`] if `url` is already registered.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.create_hook", skip(self), err)
    )]
    pub async fn create_hook(&self, url: &str) -> Result<(), Error> {
        let endpoint = self.endpoint(HOOKS_PATH)?;
        let body = CreateHookRequest {
            url: url.to_owned(),
        };
        self.send_json(Method::POST, endpoint, &body)
            .await
            .map_err(|e| e.elevate(&[ServiceErrorKind::HookExists]))?;
        Ok(())
    }

    /// `GET /hooks/`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not a list of hooks.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.hooks", skip_all, err)
    )]
    pub async fn hooks(&self) -> Result<Vec<Hook>, Error> {
        let url = self.endpoint(HOOKS_PATH)?;
        self.send(Method::GET, url).await?.decode_list()
    }

    /// `DELETE /hooks/{base64url(url)}`
    ///
    /// # Errors
    ///
    /// Returns the service error if the hook could not be removed.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "rtwire.client.delete_hook", skip(self), err)
    )]
    pub async fn delete_hook(&self, url: &str) -> Result<(), Error> {
        let endpoint = self.endpoint(&format!("{HOOKS_PATH}{}", hook_id(url)))?;
        self.send(Method::DELETE, endpoint).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, JSON_CONTENT_TYPE)
    }

    async fn send(&self, method: Method, url: Url) -> Result<Decoded, Error> {
        let target = format!("{method} {url}");
        self.dispatch(target, self.request(method, url)).await
    }

    async fn send_json<T>(&self, method: Method, url: Url, body: &T) -> Result<Decoded, Error>
    where
        T: Serialize + Sync + ?Sized,
    {
        let target = format!("{method} {url}");
        self.dispatch(target, self.request(method, url).json(body))
            .await
    }

    /// Sends a request and decodes the envelope, recording the outcome on the current span.
    async fn dispatch(&self, target: String, request: RequestBuilder) -> Result<Decoded, Error> {
        let result = async {
            let response = request
                .send()
                .await
                .map_err(|e| Error::transport(target.as_str(), e))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::transport(target.as_str(), e))?;
            codec::decode_response(&target, status, &body)
        }
        .await;

        record_result_on_span(&result);

        result
    }
}

impl RtwireClient for HttpClient {
    async fn create_account(&self) -> Result<Account, Error> {
        Self::create_account(self).await
    }

    async fn account(&self, id: AccountId) -> Result<Account, Error> {
        Self::account(self, id).await
    }

    async fn accounts(&self, options: &ListOptions) -> Result<Page<Account>, Error> {
        Self::accounts(self, options).await
    }

    async fn create_address(&self, account_id: AccountId) -> Result<String, Error> {
        Self::create_address(self, account_id).await
    }

    async fn create_transaction_ids(&self, n: u32) -> Result<Vec<TransactionId>, Error> {
        Self::create_transaction_ids(self, n).await
    }

    async fn transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        Self::transaction(self, id).await
    }

    async fn account_transactions(
        &self,
        account_id: AccountId,
        options: &ListOptions,
    ) -> Result<Page<Transaction>, Error> {
        Self::account_transactions(self, account_id, options).await
    }

    async fn transfer(
        &self,
        tx_id: TransactionId,
        from: AccountId,
        to: AccountId,
        value: u64,
    ) -> Result<(), Error> {
        Self::transfer(self, tx_id, from, to, value).await
    }

    async fn debit(
        &self,
        tx_id: TransactionId,
        from: AccountId,
        to_address: &str,
        value: u64,
    ) -> Result<(), Error> {
        Self::debit(self, tx_id, from, to_address, value).await
    }

    async fn fees(&self) -> Result<Vec<Fee>, Error> {
        Self::fees(self).await
    }

    async fn create_hook(&self, url: &str) -> Result<(), Error> {
        Self::create_hook(self, url).await
    }

    async fn hooks(&self) -> Result<Vec<Hook>, Error> {
        Self::hooks(self).await
    }

    async fn delete_hook(&self, url: &str) -> Result<(), Error> {
        Self::delete_hook(self, url).await
    }
}

/// The wire identity of a hook: its URL in URL-safe, padded base64.
#[must_use]
pub fn hook_id(url: &str) -> String {
    BASE64_URL_SAFE.encode(url.as_bytes())
}

fn set_query(url: &mut Url, pairs: &[(&'static str, String)]) {
    if pairs.is_empty() {
        return;
    }
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: fmt::Display>(result: &Result<R, E>) {
    let span = tracing::Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to RTWire failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: fmt::Display>(_result: &Result<R, E>) {}
