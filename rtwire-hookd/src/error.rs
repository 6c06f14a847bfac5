//! Error types for the hook daemon.

use crate::config::ConfigError;

/// Errors that stop the daemon.
#[derive(Debug, thiserror::Error)]
pub enum HookdError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A call to the RTWire API failed.
    #[error("RTWire API call failed: {0}")]
    Api(#[from] rtwire::Error),

    /// Binding or serving the listener failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
