//! Validation and decoding of webhook pushes.
//!
//! When a transaction is observed for an account, the service `POST`s an
//! [`Envelope`] of type `transactions` to every registered hook URL. This
//! module turns such a request (its declared content type and raw body)
//! into the list of [`TransactionEvent`]s it carries.
//!
//! The parser is stateless and performs no authentication: pushes are not
//! signed by the service, so restricting who may call the endpoint is up to
//! the application hosting it.
//!
//! Events are returned in the order they were received, which is not
//! necessarily settlement order. A transaction can be delivered more than
//! once (pending, then settled); treat each event on its own and match on
//! the transaction id.

use crate::proto::{Envelope, ObjectType, TransactionEvent};

/// The only media type accepted for webhook pushes.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Errors produced while parsing a webhook push.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request did not declare a JSON body.
    #[error("incorrect content type: {}", .0.as_deref().unwrap_or("<missing>"))]
    ContentType(Option<String>),

    /// The body is not a valid envelope, or its payload is not a list of events.
    #[error("invalid webhook body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The envelope carries an object type other than `transactions`.
    #[error("unknown object type {0}")]
    UnknownObjectType(String),
}

/// Returns `true` if `content_type` names the JSON media type.
///
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive.
#[must_use]
pub fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

/// Checks the declared content type of a push.
///
/// # Errors
///
/// Returns [`WebhookError::ContentType`] if it is missing or not JSON.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), WebhookError> {
    match content_type {
        Some(value) if is_json(value) => Ok(()),
        other => Err(WebhookError::ContentType(other.map(str::to_owned))),
    }
}

/// Decodes the body of a push whose content type was already checked.
///
/// # Errors
///
/// Returns [`WebhookError::Decode`] or [`WebhookError::UnknownObjectType`].
pub fn decode_events(body: &[u8]) -> Result<Vec<TransactionEvent>, WebhookError> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    match envelope.kind {
        ObjectType::Transactions => Ok(envelope
            .decode_payload::<Option<Vec<TransactionEvent>>>()?
            .unwrap_or_default()),
        other => Err(WebhookError::UnknownObjectType(other.into())),
    }
}

/// Validates and decodes a webhook push.
///
/// The content type is checked first; the body is not looked at when it
/// fails.
///
/// # Errors
///
/// See [`check_content_type`] and [`decode_events`].
pub fn parse_events(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Vec<TransactionEvent>, WebhookError> {
    check_content_type(content_type)?;
    decode_events(body)
}
