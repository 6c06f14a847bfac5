//! RTWire networks and their base URLs.
//!
//! The API is served under `{origin}/v1/{network}`, where the network is
//! either the Bitcoin main network or testnet3.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default API origin.
pub const DEFAULT_ORIGIN: &str = "https://api.rtwire.com";

/// Base URL for the main network.
pub const MAINNET_URL: &str = "https://api.rtwire.com/v1/mainnet";

/// Base URL for testnet3.
pub const TESTNET3_URL: &str = "https://api.rtwire.com/v1/testnet3";

/// A network served by RTWire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin main network.
    #[default]
    Mainnet,
    /// Bitcoin testnet3.
    Testnet3,
}

impl Network {
    /// Returns the path segment used for this network.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet3 => "testnet3",
        }
    }

    /// Builds the API base URL for this network under `origin`.
    ///
    /// Trailing slashes on `origin` are ignored.
    #[must_use]
    pub fn base_url(self, origin: &str) -> String {
        format!("{}/v1/{}", origin.trim_end_matches('/'), self.as_str())
    }

    /// Returns the production base URL for this network.
    #[must_use]
    pub const fn default_url(self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_URL,
            Self::Testnet3 => TESTNET3_URL,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown network name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet3" => Ok(Self::Testnet3),
            other => Err(UnknownNetwork(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(Network::Mainnet.base_url(DEFAULT_ORIGIN), MAINNET_URL);
        assert_eq!(
            Network::Testnet3.base_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/v1/testnet3"
        );
        assert_eq!(Network::Testnet3.default_url(), TESTNET3_URL);
    }

    #[test]
    fn test_parse() {
        assert_eq!("testnet3".parse::<Network>(), Ok(Network::Testnet3));
        assert!("regtest".parse::<Network>().is_err());
    }

    #[test]
    fn test_serde() {
        let n: Network = serde_json::from_str("\"mainnet\"").unwrap();
        assert_eq!(n, Network::Mainnet);
    }
}
