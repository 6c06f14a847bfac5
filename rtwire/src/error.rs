//! Error types for RTWire operations.
//!
//! A single [`Error`] enum is returned by every client operation so callers
//! can branch on the failures that matter for money movement
//! ([`Error::InsufficientFunds`], [`Error::TxIdUsed`], [`Error::HookExists`])
//! without comparing message strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boxed error type used to carry transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by RTWire client operations.
///
/// No variant is fatal: the client that produced it stays usable.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request never produced a response (connection, TLS, timeout, body read).
    #[error("transport error: {target}: {source}")]
    Transport {
        /// The request target, e.g. `GET https://api.rtwire.com/v1/mainnet/fees/`.
        target: String,
        /// The underlying transport error.
        #[source]
        source: BoxError,
    },

    /// The response body was present but was not a valid envelope.
    #[error("malformed response from {target}: {body}")]
    Protocol {
        /// The request target.
        target: String,
        /// The raw response body.
        body: String,
    },

    /// A payload that must hold an exact number of items held a different number.
    #[error("{target}: expected {expected} {resource}, got {actual}")]
    Cardinality {
        /// The request target.
        target: String,
        /// Name of the resource being decoded (e.g. `"account"`).
        resource: &'static str,
        /// The number of items the operation requires.
        expected: usize,
        /// The number of items received.
        actual: usize,
    },

    /// A payload could not be decoded into the shape the operation expects.
    #[error("failed to decode payload from {target}: {source}")]
    Decode {
        /// The request target.
        target: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A well-formed error envelope that is not elevated to a dedicated variant.
    #[error("{0}")]
    Service(ServiceError),

    /// The sending account does not hold enough funds.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The transaction id has already been consumed by a transfer or debit.
    #[error("transaction id already used")]
    TxIdUsed,

    /// A hook with the same URL is already registered.
    #[error("hook exists")]
    HookExists,

    /// The call was rejected locally before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A request URL could not be constructed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Creates a transport error for the given request target.
    pub fn transport(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Creates a decode error for the given request target.
    pub fn decode(target: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            target: target.into(),
            source,
        }
    }

    /// Promotes a generic [`Error::Service`] to a dedicated variant when its
    /// classification is one of `kinds`.
    ///
    /// Every other error is returned unchanged. Operations call this with the
    /// conditions their callers are expected to branch on.
    #[must_use]
    pub fn elevate(self, kinds: &[ServiceErrorKind]) -> Self {
        match self {
            Self::Service(err) => match err.kind() {
                Some(kind) if kinds.contains(&kind) => kind.into(),
                _ => Self::Service(err),
            },
            other => other,
        }
    }

    /// Returns the service error carried by [`Error::Service`], if any.
    #[must_use]
    pub const fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceErrorKind> for Error {
    fn from(kind: ServiceErrorKind) -> Self {
        match kind {
            ServiceErrorKind::InsufficientFunds => Self::InsufficientFunds,
            ServiceErrorKind::TxIdUsed => Self::TxIdUsed,
            ServiceErrorKind::HookExists => Self::HookExists,
        }
    }
}

/// A domain error reported by the service inside an `error` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Human-readable message supplied by the service.
    #[serde(alias = "Message")]
    pub message: String,
    /// Machine-readable error code, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    /// Creates a service error with a message and no code.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Sets the machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Classifies this error into one of the well-known conditions.
    #[must_use]
    pub fn kind(&self) -> Option<ServiceErrorKind> {
        ServiceErrorKind::classify(self)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Domain conditions that callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// The sending account does not hold enough funds.
    InsufficientFunds,
    /// The transaction id has already been consumed.
    #[serde(rename = "txid_used")]
    TxIdUsed,
    /// The hook URL is already registered.
    HookExists,
}

impl ServiceErrorKind {
    /// All known kinds.
    pub const ALL: [Self; 3] = [Self::InsufficientFunds, Self::TxIdUsed, Self::HookExists];

    /// The machine-readable code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InsufficientFunds => "insufficient_funds",
            Self::TxIdUsed => "txid_used",
            Self::HookExists => "hook_exists",
        }
    }

    /// The message the service uses for this kind.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InsufficientFunds => "insufficient funds",
            Self::TxIdUsed => "TxID used",
            Self::HookExists => "hook exists",
        }
    }

    /// Classifies a service error.
    ///
    /// A recognised `code` takes precedence. Otherwise the message is compared
    /// case-insensitively, ignoring surrounding whitespace.
    #[must_use]
    pub fn classify(err: &ServiceError) -> Option<Self> {
        if let Some(code) = err.code.as_deref() {
            if let Some(kind) = Self::ALL.into_iter().find(|k| k.code() == code) {
                return Some(kind);
            }
        }
        let message = err.message.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.message().eq_ignore_ascii_case(message))
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_message() {
        let err = ServiceError::new("insufficient funds");
        assert_eq!(err.kind(), Some(ServiceErrorKind::InsufficientFunds));

        let err = ServiceError::new("  Hook Exists ");
        assert_eq!(err.kind(), Some(ServiceErrorKind::HookExists));

        let err = ServiceError::new("txid used");
        assert_eq!(err.kind(), Some(ServiceErrorKind::TxIdUsed));
    }

    #[test]
    fn test_classify_code_wins_over_message() {
        let err = ServiceError::new("something else entirely").with_code("txid_used");
        assert_eq!(err.kind(), Some(ServiceErrorKind::TxIdUsed));
    }

    #[test]
    fn test_classify_unknown_code_falls_back_to_message() {
        let err = ServiceError::new("hook exists").with_code("E1234");
        assert_eq!(err.kind(), Some(ServiceErrorKind::HookExists));
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(ServiceError::new("account not found").kind(), None);
    }

    #[test]
    fn test_elevate_only_requested_kinds() {
        let err = Error::Service(ServiceError::new("hook exists"));
        assert!(matches!(
            err.elevate(&[ServiceErrorKind::HookExists]),
            Error::HookExists
        ));

        let err = Error::Service(ServiceError::new("hook exists"));
        let err = err.elevate(&[ServiceErrorKind::InsufficientFunds]);
        assert_eq!(
            err.as_service().map(|e| e.message.as_str()),
            Some("hook exists")
        );
    }

    #[test]
    fn test_elevate_leaves_other_errors() {
        let err = Error::InvalidArgument("n".into()).elevate(&ServiceErrorKind::ALL);
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_service_error_display() {
        assert_eq!(ServiceError::new("nope").to_string(), "nope");
        assert_eq!(
            ServiceError::new("nope").with_code("denied").to_string(),
            "nope (denied)"
        );
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&ServiceErrorKind::TxIdUsed).unwrap();
        assert_eq!(json, "\"txid_used\"");
    }
}
