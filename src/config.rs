//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable     | Default      |
//! |--------------|--------------|
//! | `HOST`       | `0.0.0.0`    |
//! | `PORT`       | `3000`       |
//! | `INDEX_PATH` | `index.html` |
//! | `WATCH_PATH` | `INDEX_PATH` |
//! | `LOG_FORMAT` | `text`       |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::RelayError;
use crate::telemetry::LogFormat;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default page served at `/` and watched for changes.
pub const DEFAULT_INDEX_PATH: &str = "index.html";

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Page served at `/`.
    pub index_path: PathBuf,

    /// File whose modification triggers a reload broadcast.
    pub watch_path: PathBuf,

    /// Log output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first so a `.env` file may supply
    /// any of the variables.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if `HOST`, `PORT` or
    /// `LOG_FORMAT` is set but unparsable.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = parse_var(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = parse_var(&lookup, "PORT", DEFAULT_PORT)?;

        let index_path = lookup("INDEX_PATH")
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_INDEX_PATH), PathBuf::from);
        let watch_path = lookup("WATCH_PATH")
            .filter(|v| !v.is_empty())
            .map_or_else(|| index_path.clone(), PathBuf::from);

        let log_format = parse_var(&lookup, "LOG_FORMAT", LogFormat::Text)?;

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            index_path,
            watch_path,
            log_format,
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            watch_path: PathBuf::from(DEFAULT_INDEX_PATH),
            log_format: LogFormat::Text,
        }
    }
}

/// Parses `key` as `T`, returning `default` when unset or empty.
fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, RelayError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| RelayError::InvalidConfig { key, value }),
        None => Ok(default),
    }
}
