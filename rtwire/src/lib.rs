#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the RTWire payment API.
//!
//! RTWire is a hosted ledger: callers create accounts, hand out deposit
//! addresses, move funds between accounts and out to external addresses,
//! and receive webhook notifications when deposits are observed. This crate
//! holds everything that does not depend on a particular HTTP stack.
//!
//! # Overview
//!
//! Every response from the service is wrapped in an [`Envelope`] of the form
//! `{"type": ..., "next": ..., "payload": ...}`. The [`codec`] module turns a
//! completed HTTP exchange into either a payload or a typed [`Error`]; the
//! [`RtwireClient`] trait describes the operations built on top of it.
//!
//! Money movement is made idempotent by issuing [`TransactionId`]s ahead of
//! time with [`RtwireClient::create_transaction_ids`]. A caller persists the
//! id, then submits a transfer or debit under it. Resubmitting after a crash
//! reuses the same id, and the service rejects the duplicate with
//! [`Error::TxIdUsed`] instead of moving funds twice.
//!
//! # Modules
//!
//! - [`client`] - The [`RtwireClient`] operation trait
//! - [`codec`] - Envelope decoding and error classification
//! - [`error`] - The [`Error`] taxonomy shared by all operations
//! - [`network`] - Network identifiers and base URLs
//! - [`paginate`] - Cursor-driven streams over list endpoints
//! - [`proto`] - Wire format types
//! - [`query`] - List options, cursors and pages
//! - [`webhook`] - Validation and decoding of inbound webhook pushes
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing events for codec decisions

pub mod client;
pub mod codec;
pub mod error;
pub mod network;
pub mod paginate;
pub mod proto;
pub mod query;
pub mod webhook;

pub use client::RtwireClient;
pub use error::{Error, ServiceError, ServiceErrorKind};
pub use network::Network;
pub use proto::{
    Account, AccountId, Envelope, EventStatus, Fee, Hook, ObjectType, Transaction,
    TransactionEvent, TransactionId, TransactionType,
};
pub use query::{Cursor, ListOption, ListOptions, Page};
pub use webhook::{WebhookError, parse_events};
