//! Wire format types for the RTWire API.
//!
//! Every response body is an [`Envelope`]. Its `type` tag says how to read
//! the raw `payload`; the `next` field carries the pagination cursor for
//! list endpoints.
//!
//! # Key Types
//!
//! - [`Envelope`] / [`ObjectType`] - The uniform response wrapper
//! - [`Account`], [`Transaction`], [`Fee`], [`Hook`] - Resources
//! - [`TransactionEvent`] - A transaction pushed to a registered hook
//! - [`requests`] - Request bodies sent to the service
//!
//! All types serialize to JSON using the service's camelCase field names.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_with::{DefaultOnNull, serde_as};

pub mod requests;
mod resources;

pub use resources::{
    Account, AccountId, Address, EventStatus, Fee, Hook, IssuedTransaction, Transaction,
    TransactionEvent, TransactionId, TransactionType,
};

/// The `type` tag of an [`Envelope`].
///
/// The service uses a closed set of tags. Unrecognised tags are kept
/// verbatim in [`ObjectType::Other`] so they can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectType {
    /// A list of [`Account`]s.
    Accounts,
    /// A list of [`Address`]es.
    Addresses,
    /// A list of [`Transaction`]s or [`TransactionEvent`]s.
    Transactions,
    /// A list of [`Fee`]s.
    Fees,
    /// A list of [`Hook`]s.
    Hooks,
    /// A list of error details.
    Error,
    /// Any tag outside the known set.
    Other(String),
}

impl ObjectType {
    /// Returns the wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accounts => "accounts",
            Self::Addresses => "addresses",
            Self::Transactions => "transactions",
            Self::Fees => "fees",
            Self::Hooks => "hooks",
            Self::Error => "error",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ObjectType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "accounts" => Self::Accounts,
            "addresses" => Self::Addresses,
            "transactions" => Self::Transactions,
            "fees" => Self::Fees,
            "hooks" => Self::Hooks,
            "error" => Self::Error,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for ObjectType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_owned())
    }
}

impl From<ObjectType> for String {
    fn from(value: ObjectType) -> Self {
        match value {
            ObjectType::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{type, next, payload}` wrapper around every response body.
///
/// `payload` is kept as raw JSON until the tag is known. Keys are also
/// accepted capitalized, and a `null` cursor reads as an empty one.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// The kind of object carried in `payload`.
    #[serde(rename = "type", alias = "Type")]
    pub kind: ObjectType,
    /// Pagination cursor; empty when there is no further page.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Next")]
    pub next: String,
    /// The undecoded payload.
    #[serde(default, alias = "Payload")]
    pub payload: Option<Box<RawValue>>,
}

impl Envelope {
    /// Builds an envelope around an already-serializable payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `payload` cannot be serialized.
    pub fn new<T: Serialize + ?Sized>(
        kind: ObjectType,
        next: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind,
            next: next.into(),
            payload: Some(serde_json::value::to_raw_value(payload)?),
        })
    }

    /// Returns `true` if this is an `error` envelope.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == ObjectType::Error
    }

    /// Decodes the payload into `T`.
    ///
    /// A missing payload is decoded as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the payload does not match `T`.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        decode_raw(self.payload.as_deref())
    }
}

/// Decodes an optional raw payload, treating absence as JSON `null`.
pub(crate) fn decode_raw<T: DeserializeOwned>(
    payload: Option<&RawValue>,
) -> Result<T, serde_json::Error> {
    serde_json::from_str(payload.map_or("null", RawValue::get))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_roundtrip_known() {
        for tag in ["accounts", "addresses", "transactions", "fees", "hooks", "error"] {
            let kind: ObjectType = serde_json::from_str(&format!("\"{tag}\"")).unwrap();
            assert!(!matches!(kind, ObjectType::Other(_)), "{tag} not recognised");
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{tag}\""));
        }
    }

    #[test]
    fn test_object_type_keeps_unknown_tag() {
        let kind: ObjectType = serde_json::from_str("\"widgets\"").unwrap();
        assert_eq!(kind, ObjectType::Other("widgets".into()));
        assert_eq!(kind.to_string(), "widgets");
    }

    #[test]
    fn test_envelope_next_defaults_to_empty() {
        let env: Envelope =
            serde_json::from_str(r#"{"type":"hooks","payload":[{"url":"https://a"}]}"#).unwrap();
        assert_eq!(env.kind, ObjectType::Hooks);
        assert!(env.next.is_empty());
        let hooks: Vec<Hook> = env.decode_payload().unwrap();
        assert_eq!(hooks[0].url, "https://a");
    }

    #[test]
    fn test_envelope_null_next_and_capitalized_keys() {
        let env: Envelope =
            serde_json::from_str(r#"{"Type":"hooks","Next":null,"Payload":[]}"#).unwrap();
        assert_eq!(env.kind, ObjectType::Hooks);
        assert!(env.next.is_empty());
        assert_eq!(env.decode_payload::<Vec<Hook>>().unwrap(), vec![]);
    }

    #[test]
    fn test_envelope_missing_payload_decodes_as_null() {
        let env: Envelope = serde_json::from_str(r#"{"type":"accounts"}"#).unwrap();
        assert!(env.decode_payload::<Vec<Account>>().is_err());
        assert_eq!(env.decode_payload::<Option<Vec<Account>>>().unwrap(), None);
    }

    #[test]
    fn test_envelope_new_serializes_payload() {
        let env = Envelope::new(ObjectType::Hooks, "", &[Hook::new("https://h")]).unwrap();
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "hooks", "next": "", "payload": [{"url": "https://h"}]})
        );
    }
}
