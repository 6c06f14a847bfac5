//! Axum extractor for webhook pushes.
//!
//! ```ignore
//! async fn on_push(TransactionEvents(events): TransactionEvents) -> StatusCode {
//!     for event in events { /* ... */ }
//!     StatusCode::OK
//! }
//! ```

use axum_core::extract::{FromRequest, Request};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use rtwire::TransactionEvent;
use rtwire::webhook::{check_content_type, decode_events};

use crate::error::WebhookRejection;

/// The events carried by one webhook push, in delivery order.
///
/// Rejects with `415 Unsupported Media Type` when the request is not
/// declared as JSON (the body is not read), and with `400 Bad Request`
/// when the body is not a `transactions` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvents(pub Vec<TransactionEvent>);

impl<S> FromRequest<S> for TransactionEvents
where
    S: Send + Sync,
{
    type Rejection = WebhookRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        check_content_type(content_type.as_deref())?;

        let body = Bytes::from_request(req, state).await?;
        let events = decode_events(&body)?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(count = events.len(), "decoded webhook push");

        Ok(Self(events))
    }
}

impl IntoIterator for TransactionEvents {
    type Item = TransactionEvent;
    type IntoIter = std::vec::IntoIter<TransactionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
