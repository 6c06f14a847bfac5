//! Daemon configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 4030
//! path = "/rtwire/hook"
//! public_url = "https://hooks.example.com/rtwire/hook"
//!
//! [api]
//! network = "testnet3"
//! user = "$RTWIRE_USER"
//! password = "${RTWIRE_PASSWORD}"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `config.toml`)
//! - `HOST` - Override server bind address
//! - `PORT` - Override server port
//! - API credentials referenced by `$VAR` in the config file

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use rtwire::Network;
use rtwire_http::ClientConfig;
use serde::{Deserialize, Serialize};

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`HookdConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookdConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `4030`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route that receives pushes (default: `/rtwire/hook`).
    #[serde(default = "default_path")]
    pub path: String,

    /// Externally reachable URL of `path`. Registered as a hook on start-up
    /// when set.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Delete the hook again on graceful shutdown.
    #[serde(default)]
    pub unregister_on_shutdown: bool,

    /// API access.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Credentials and endpoint of the RTWire API.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Network to talk to when `url` is not set (default: mainnet).
    #[serde(default)]
    pub network: Network,

    /// Explicit base URL, overriding `network`.
    #[serde(default)]
    pub url: Option<String>,

    /// Basic-auth user name.
    #[serde(default)]
    pub user: String,

    /// Basic-auth password.
    #[serde(default)]
    pub password: String,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("network", &self.network)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Builds the client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let url = self
            .url
            .clone()
            .unwrap_or_else(|| self.network.default_url().to_owned());
        let config = ClientConfig::new(url, self.user.clone(), self.password.clone());
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    /// Returns `true` if a credential is empty or still holds an unexpanded `$VAR`.
    #[must_use]
    pub fn has_unresolved_credentials(&self) -> bool {
        [&self.user, &self.password]
            .iter()
            .any(|value| value.is_empty() || value.starts_with('$'))
    }
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    4030
}

fn default_path() -> String {
    "/rtwire/hook".to_owned()
}

impl HookdConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// After loading, all `$VAR` / `${VAR}` references are expanded from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?
        } else {
            String::new()
        };
        Self::parse(&content)
    }

    /// Parses configuration from TOML text, expanding environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid or `path` is not absolute.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content);
        let config: Self = toml::from_str(&expanded)?;
        if !config.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "path must start with '/': {}",
                config.path
            )));
        }
        Ok(config)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "USER" => Some("alice".to_owned()),
            "PASS" => Some("s3cret".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_plain_and_braced() {
        assert_eq!(expand_with("$USER:${PASS}", lookup), "alice:s3cret");
        assert_eq!(expand_with("x${USER}y", lookup), "xalicey");
    }

    #[test]
    fn test_unresolved_left_as_is() {
        assert_eq!(expand_with("$MISSING", lookup), "$MISSING");
        assert_eq!(expand_with("${MISSING}", lookup), "${MISSING}");
        assert_eq!(expand_with("cost: $5", lookup), "cost: $5");
        assert_eq!(expand_with("a $ b", lookup), "a $ b");
        assert_eq!(expand_with("${UNCLOSED", lookup), "${UNCLOSED");
    }

    #[test]
    fn test_defaults() {
        let config = HookdConfig::parse("").unwrap();
        assert_eq!(config.port, 4030);
        assert_eq!(config.path, "/rtwire/hook");
        assert!(config.public_url.is_none());
        assert_eq!(config.api.network, Network::Mainnet);
        assert!(config.api.has_unresolved_credentials());
        assert_eq!(config.api.client_config().url, rtwire::network::MAINNET_URL);
    }

    #[test]
    fn test_full_config() {
        let config = HookdConfig::parse(
            r#"
            host = "127.0.0.1"
            port = 8080
            path = "/in"
            public_url = "https://example.com/in"
            unregister_on_shutdown = true

            [api]
            network = "testnet3"
            user = "u"
            password = "p"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(config.unregister_on_shutdown);
        assert!(!config.api.has_unresolved_credentials());
        let client = config.api.client_config();
        assert_eq!(client.url, rtwire::network::TESTNET3_URL);
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = HookdConfig::parse(
            r#"
            [api]
            network = "testnet3"
            url = "http://localhost:9000/v1/testnet3"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.api.client_config().url,
            "http://localhost:9000/v1/testnet3"
        );
    }

    #[test]
    fn test_relative_path_rejected() {
        let err = HookdConfig::parse(r#"path = "hook""#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = HookdConfig::parse("[api]\npassword = \"hunter2\"").unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
