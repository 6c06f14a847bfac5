//! Error types for the HTTP layer.

use axum_core::extract::rejection::BytesRejection;
use axum_core::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::CONTENT_TYPE;
use rtwire::WebhookError;

use crate::constants::JSON_CONTENT_TYPE;

/// Rejection returned by the [`TransactionEvents`](crate::webhook::TransactionEvents) extractor.
#[derive(Debug, thiserror::Error)]
pub enum WebhookRejection {
    /// The push failed validation or decoding.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// The request body could not be read.
    #[error("failed to read webhook body: {0}")]
    Body(#[from] BytesRejection),
}

impl WebhookRejection {
    /// The HTTP status sent back to the service.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Webhook(WebhookError::ContentType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Webhook(_) => StatusCode::BAD_REQUEST,
            Self::Body(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        #[cfg(feature = "telemetry")]
        tracing::warn!(error = %self, "rejected webhook push");

        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() }).to_string();
        (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
    }
}
