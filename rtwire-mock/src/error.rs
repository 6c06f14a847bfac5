//! Error types for the mock service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rtwire::{ServiceError, ServiceErrorKind};

use crate::handlers::envelope_response;

/// Domain failures reported to clients inside an `error` envelope.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// Missing or wrong Basic credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The sending account cannot cover the value.
    #[error("{}", ServiceErrorKind::InsufficientFunds.message())]
    InsufficientFunds,

    /// The transaction id was already consumed.
    #[error("{}", ServiceErrorKind::TxIdUsed.message())]
    TxIdUsed,

    /// The hook URL is already registered.
    #[error("{}", ServiceErrorKind::HookExists.message())]
    HookExists,

    /// No such account.
    #[error("account not found")]
    AccountNotFound,

    /// No such deposit address.
    #[error("address not found")]
    AddressNotFound,

    /// No such transaction.
    #[error("transaction not found")]
    TransactionNotFound,

    /// A hook id that is not URL-safe base64 of a UTF-8 URL.
    #[error("invalid hook id")]
    InvalidHookId,

    /// The transaction id was never issued.
    #[error("unknown transaction id")]
    UnknownTransactionId,

    /// A zero or out-of-range amount or count.
    #[error("invalid value")]
    InvalidValue,

    /// A pagination cursor this service did not hand out.
    #[error("invalid cursor")]
    InvalidCursor,

    /// JSON deserialization of the request body failed.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl MockError {
    /// The HTTP status this error is served with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::TxIdUsed | Self::HookExists => StatusCode::CONFLICT,
            Self::AccountNotFound
            | Self::AddressNotFound
            | Self::TransactionNotFound => StatusCode::NOT_FOUND,
            Self::InsufficientFunds
            | Self::UnknownTransactionId
            | Self::InvalidHookId
            | Self::InvalidValue
            | Self::InvalidCursor
            | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejecting request");
        let status = self.status();
        let details = [ServiceError::new(self.to_string())];
        (status, envelope_response(rtwire::ObjectType::Error, String::new(), &details))
            .into_response()
    }
}
