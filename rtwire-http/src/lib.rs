//! HTTP transport for the RTWire payment API.
//!
//! Provides the `reqwest` implementation of [`rtwire::RtwireClient`] and an
//! axum extractor for webhook pushes.
//!
//! # Modules
//!
//! - [`client`] - [`HttpClient`] and its [`ClientConfig`]
//! - [`constants`] - content type, timeout, and endpoint paths
//! - [`error`] - webhook rejection returned to the service
//! - [`webhook`] - [`TransactionEvents`] extractor

pub mod client;
pub mod constants;
pub mod error;
pub mod webhook;

pub use client::{ClientConfig, HttpClient, hook_id};
pub use error::WebhookRejection;
pub use webhook::TransactionEvents;
