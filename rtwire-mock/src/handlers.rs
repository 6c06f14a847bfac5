//! Axum route handlers for the mock service.
//!
//! Every response is an envelope, except successful transfers and debits
//! which, like the real service, answer with an empty body.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use rtwire::proto::Address;
use rtwire::proto::requests::{CreateHookRequest, IssueTransactionIds, SubmitTransaction};
use rtwire::{AccountId, Envelope, ObjectType, TransactionId};

use crate::error::MockError;
use crate::state::MockService;

/// Shared application state for the mock service.
pub type MockState = Arc<MockService>;

/// Query string accepted by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page size.
    pub limit: Option<u32>,
    /// Cursor from a previous page.
    pub next: Option<String>,
    /// `pending` restricts a transaction listing to pending transactions.
    pub status: Option<String>,
}

/// Body of the deposit simulation endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Deposit {
    /// Amount credited, in satoshi.
    pub value: u64,
    /// Record the credit as pending instead of settled.
    #[serde(default)]
    pub pending: bool,
}

/// Serializes an envelope into a JSON response.
pub(crate) fn envelope_response<T: Serialize + ?Sized>(
    kind: ObjectType,
    next: String,
    payload: &T,
) -> Response {
    match Envelope::new(kind, next, payload) {
        Ok(envelope) => Json(envelope).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode envelope");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, MockError> {
    Ok(serde_json::from_slice(body)?)
}

/// `POST /accounts/`
pub async fn create_account(State(svc): State<MockState>) -> Response {
    let account = svc.ledger().await.create_account();
    tracing::info!(id = %account.id, "created account");
    envelope_response(ObjectType::Accounts, String::new(), &[account])
}

/// `GET /accounts/{id}`
///
/// # Errors
///
/// Returns 404 for an unknown account.
pub async fn get_account(
    State(svc): State<MockState>,
    Path(id): Path<AccountId>,
) -> Result<Response, MockError> {
    let account = svc.ledger().await.account(id)?;
    Ok(envelope_response(ObjectType::Accounts, String::new(), &[account]))
}

/// `GET /accounts/`
///
/// # Errors
///
/// Returns 400 for a bad cursor or limit.
pub async fn list_accounts(
    State(svc): State<MockState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, MockError> {
    let (accounts, next) = svc
        .ledger()
        .await
        .accounts(query.limit, query.next.as_deref())?;
    Ok(envelope_response(ObjectType::Accounts, next, &accounts))
}

/// `POST /accounts/{id}/addresses/`
///
/// # Errors
///
/// Returns 404 for an unknown account.
pub async fn create_address(
    State(svc): State<MockState>,
    Path(id): Path<AccountId>,
) -> Result<Response, MockError> {
    let address = svc.ledger().await.create_address(id)?;
    tracing::info!(account = %id, %address, "created address");
    Ok(envelope_response(
        ObjectType::Addresses,
        String::new(),
        &[Address { address }],
    ))
}

/// `GET /accounts/{id}/transactions/`
///
/// # Errors
///
/// Returns 404 for an unknown account, or 400 for a bad cursor or limit.
pub async fn list_account_transactions(
    State(svc): State<MockState>,
    Path(id): Path<AccountId>,
    Query(query): Query<ListQuery>,
) -> Result<Response, MockError> {
    let pending_only = query.status.as_deref() == Some("pending");
    let (transactions, next) = svc.ledger().await.account_transactions(
        id,
        pending_only,
        query.limit,
        query.next.as_deref(),
    )?;
    Ok(envelope_response(ObjectType::Transactions, next, &transactions))
}

/// `POST /transactions/` - issues transaction ids.
///
/// # Errors
///
/// Returns 400 for a malformed body or an out-of-range count.
pub async fn issue_transaction_ids(
    State(svc): State<MockState>,
    body: Bytes,
) -> Result<Response, MockError> {
    let IssueTransactionIds { n } = parse_body(&body)?;
    let issued = svc.ledger().await.issue_transaction_ids(n)?;
    tracing::info!(n, "issued transaction ids");
    Ok(envelope_response(ObjectType::Transactions, String::new(), &issued))
}

/// `PUT /transactions/` - executes a transfer or debit.
///
/// # Errors
///
/// Returns the envelope error of the first failed check.
pub async fn submit_transaction(
    State(svc): State<MockState>,
    body: Bytes,
) -> Result<StatusCode, MockError> {
    let request: SubmitTransaction = parse_body(&body)?;
    let tx = svc.ledger().await.submit(&request)?;
    tracing::info!(id = %tx.id, kind = ?tx.kind, value = tx.value, "executed transaction");
    Ok(StatusCode::OK)
}

/// `GET /transactions/{id}`
///
/// # Errors
///
/// Returns 404 for an unknown transaction.
pub async fn get_transaction(
    State(svc): State<MockState>,
    Path(id): Path<TransactionId>,
) -> Result<Response, MockError> {
    let tx = svc.ledger().await.transaction(id)?;
    Ok(envelope_response(ObjectType::Transactions, String::new(), &[tx]))
}

/// `GET /fees/`
pub async fn get_fees(State(svc): State<MockState>) -> Response {
    let fees = svc.ledger().await.fees();
    envelope_response(ObjectType::Fees, String::new(), &fees)
}

/// `POST /hooks/`
///
/// # Errors
///
/// Returns 409 if the URL is already registered.
pub async fn create_hook(
    State(svc): State<MockState>,
    body: Bytes,
) -> Result<Response, MockError> {
    let CreateHookRequest { url } = parse_body(&body)?;
    svc.ledger().await.create_hook(&url)?;
    tracing::info!(%url, "registered hook");
    Ok(envelope_response(ObjectType::Hooks, String::new(), &[rtwire::Hook::new(url)]))
}

/// `GET /hooks/`
pub async fn list_hooks(State(svc): State<MockState>) -> Response {
    let hooks = svc.ledger().await.hooks();
    envelope_response(ObjectType::Hooks, String::new(), &hooks)
}

/// `DELETE /hooks/{id}` where `id` is the URL-safe base64 of the hook URL.
///
/// # Errors
///
/// Returns 400 if `id` does not decode. Deleting an unregistered hook
/// succeeds.
pub async fn delete_hook(
    State(svc): State<MockState>,
    Path(hook_id): Path<String>,
) -> Result<StatusCode, MockError> {
    svc.ledger().await.delete_hook(&hook_id)?;
    tracing::info!(%hook_id, "deleted hook");
    Ok(StatusCode::OK)
}

/// `POST /addresses/{address}` - simulates an external credit.
///
/// # Errors
///
/// Returns 404 for an unknown address, or 400 for a zero value.
pub async fn deposit(
    State(svc): State<MockState>,
    Path(address): Path<String>,
    body: Bytes,
) -> Result<Response, MockError> {
    let Deposit { value, pending } = parse_body(&body)?;
    let event = svc.ledger().await.deposit(&address, value, pending)?;
    tracing::info!(%address, value, pending, id = %event.transaction.id, "credited address");
    Ok(envelope_response(
        ObjectType::Transactions,
        String::new(),
        &[event],
    ))
}

/// Rejects requests without the configured Basic credentials.
///
/// # Errors
///
/// Returns 401 with an `unauthorized` error envelope.
pub async fn require_auth(
    State(svc): State<MockState>,
    request: Request,
    next: Next,
) -> Result<Response, MockError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| svc.credentials().accepts(value));
    if !authorized {
        return Err(MockError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Creates the mock [`axum::Router`], mounted under `/v1/{network}`.
///
/// Endpoints (relative to the network prefix):
/// - `POST /accounts/`, `GET /accounts/`, `GET /accounts/{id}`
/// - `POST /accounts/{id}/addresses/`, `GET /accounts/{id}/transactions/`
/// - `POST /transactions/`, `PUT /transactions/`, `GET /transactions/{id}`
/// - `GET /fees/`
/// - `POST /hooks/`, `GET /hooks/`, `DELETE /hooks/{id}`
/// - `POST /addresses/{address}` - deposit simulation
pub fn mock_router(state: MockState) -> axum::Router {
    let api = axum::Router::new()
        .route("/accounts/", post(create_account).get(list_accounts))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/addresses/", post(create_address))
        .route(
            "/accounts/{id}/transactions/",
            get(list_account_transactions),
        )
        .route(
            "/transactions/",
            post(issue_transaction_ids).put(submit_transaction),
        )
        .route("/transactions/{id}", get(get_transaction))
        .route("/fees/", get(get_fees))
        .route("/hooks/", post(create_hook).get(list_hooks))
        .route("/hooks/{id}", delete(delete_hook))
        .route("/addresses/{address}", post(deposit))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth,
        ));

    let prefix = format!("/v1/{}", state.network());
    axum::Router::new().nest(&prefix, api).with_state(state)
}
