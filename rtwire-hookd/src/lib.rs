//! Webhook receiver for RTWire transaction pushes.
//!
//! Serves a single push endpoint, logs every transaction event it receives,
//! and optionally keeps its own hook registered with the service.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment variable expansion
//! - [`error`] - daemon error types
//! - [`handlers`] - Axum route handlers and router builder
//! - [`registration`] - hook (un)registration

pub mod config;
pub mod error;
pub mod handlers;
pub mod registration;

pub use handlers::{HookStats, HookdState, hookd_router};
