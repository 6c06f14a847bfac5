//! HTTP-specific constants for the RTWire API.

use std::time::Duration;

/// Media type of every request and response body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the accounts collection, relative to the network base URL.
pub const ACCOUNTS_PATH: &str = "accounts/";

/// Path of the transactions collection.
pub const TRANSACTIONS_PATH: &str = "transactions/";

/// Path of the fee estimates.
pub const FEES_PATH: &str = "fees/";

/// Path of the hooks collection.
pub const HOOKS_PATH: &str = "hooks/";
