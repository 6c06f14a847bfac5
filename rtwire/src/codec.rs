//! Envelope decoding for completed HTTP exchanges.
//!
//! [`decode_response`] is transport-agnostic: it takes the request target,
//! the status code and the raw body, and returns either a [`Decoded`]
//! payload or a typed [`Error`].
//!
//! Success is decided by the envelope's `type` tag, not by the status code:
//! the service sometimes returns error envelopes under 2xx statuses. The
//! only status-dependent rule is that an empty body with a 2xx status is a
//! success without payload (transfers, debits and hook deletions).

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::{Error, ServiceError};
use crate::proto::{Envelope, decode_raw};
use crate::query::{Cursor, Page};

/// The successful outcome of one request.
#[derive(Debug)]
pub struct Decoded {
    target: String,
    next: Option<Cursor>,
    payload: Option<Box<RawValue>>,
    bodyless: bool,
}

impl Decoded {
    /// The request target this response belongs to.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The pagination cursor, if the service returned a non-empty one.
    #[must_use]
    pub const fn next(&self) -> Option<&Cursor> {
        self.next.as_ref()
    }

    /// Returns `true` if the response carried no payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// Returns `true` if the response had no body at all.
    #[must_use]
    pub const fn is_bodyless(&self) -> bool {
        self.bodyless
    }

    /// Decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is absent or does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        decode_raw(self.payload.as_deref()).map_err(|e| Error::decode(self.target.clone(), e))
    }

    /// Decodes a list payload, reading a `null` or absent payload as an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not a list of `T`, or if
    /// the response had no body.
    pub fn decode_list<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        if self.bodyless {
            return self.decode();
        }
        self.decode::<Option<Vec<T>>>().map(Option::unwrap_or_default)
    }

    /// Decodes a list payload together with its cursor.
    ///
    /// # Errors
    ///
    /// See [`Decoded::decode_list`].
    pub fn into_page<T: DeserializeOwned>(self) -> Result<Page<T>, Error> {
        let items = self.decode_list()?;
        Ok(Page {
            next: self.next,
            items,
        })
    }

    /// Decodes a list payload that must hold exactly `expected` items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on a shape mismatch and
    /// [`Error::Cardinality`] on a count mismatch.
    pub fn exactly<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        expected: usize,
    ) -> Result<Vec<T>, Error> {
        let items: Vec<T> = self.decode()?;
        if items.len() == expected {
            Ok(items)
        } else {
            Err(Error::Cardinality {
                target: self.target.clone(),
                resource,
                expected,
                actual: items.len(),
            })
        }
    }

    /// Decodes a list payload that must hold exactly one item.
    ///
    /// # Errors
    ///
    /// See [`Decoded::exactly`].
    pub fn one<T: DeserializeOwned>(&self, resource: &'static str) -> Result<T, Error> {
        self.exactly(resource, 1)?
            .pop()
            .ok_or_else(|| Error::Cardinality {
                target: self.target.clone(),
                resource,
                expected: 1,
                actual: 0,
            })
    }
}

/// Decodes a completed HTTP exchange.
///
/// # Errors
///
/// - [`Error::Protocol`] if a non-empty body is not an envelope, or an error
///   envelope carries no details
/// - [`Error::Decode`] if an error envelope's payload cannot be decoded
/// - [`Error::Service`] for a well-formed error envelope
pub fn decode_response(target: &str, status: u16, body: &[u8]) -> Result<Decoded, Error> {
    if body.is_empty() && (200..300).contains(&status) {
        #[cfg(feature = "telemetry")]
        tracing::debug!(target_url = %target, status, "empty response body");
        return Ok(Decoded {
            target: target.to_owned(),
            next: None,
            payload: None,
            bodyless: true,
        });
    }

    let envelope: Envelope = serde_json::from_slice(body).map_err(|_e| {
        #[cfg(feature = "telemetry")]
        tracing::debug!(target_url = %target, status, error = %_e, "response is not an envelope");
        protocol_error(target, body)
    })?;

    if envelope.is_error() {
        return Err(service_error(target, body, &envelope));
    }

    Ok(Decoded {
        target: target.to_owned(),
        next: Cursor::from_wire(envelope.next),
        payload: envelope.payload,
        bodyless: false,
    })
}

fn service_error(target: &str, body: &[u8], envelope: &Envelope) -> Error {
    let details: Vec<ServiceError> = match envelope.decode_payload() {
        Ok(details) => details,
        Err(e) => return Error::decode(target, e),
    };
    match details.into_iter().next() {
        Some(first) => Error::Service(first),
        None => protocol_error(target, body),
    }
}

fn protocol_error(target: &str, body: &[u8]) -> Error {
    Error::Protocol {
        target: target.to_owned(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}
