//! In-memory RTWire service.
//!
//! Serves the RTWire REST API from a process-local ledger so that clients
//! can be exercised end to end without network access or real funds. On
//! top of the public API it exposes `POST /addresses/{address}`, which
//! simulates an on-chain payment to a deposit address.
//!
//! ```ignore
//! let service = Arc::new(MockService::new(Network::Testnet3, Credentials::new("user", "pass")));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
//! tokio::spawn(axum::serve(listener, mock_router(service)).into_future());
//! ```
//!
//! # Modules
//!
//! - [`handlers`] - Axum route handlers and router builder
//! - [`state`] - the ledger and its credentials
//! - [`error`] - domain errors rendered as error envelopes

pub mod error;
pub mod handlers;
pub mod state;

pub use error::MockError;
pub use handlers::{MockState, mock_router};
pub use state::{Credentials, Ledger, MockService};
