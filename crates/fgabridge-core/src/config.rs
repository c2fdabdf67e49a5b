//! Connection and server settings.
//!
//! `FgaSettings` mirrors the environment contract of the bridge:
//! `FGA_API_SCHEME`, `FGA_API_HOST`, `FGA_STORE_ID`, `FGA_STORE_NAME` and
//! `FGA_AUTHORIZATION_MODEL_ID`. Fields stay optional here; the client
//! provider decides at construction time what is actually required.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default per-request timeout against the backend.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Scheme was neither `http` nor `https`.
    #[error("invalid API scheme '{0}': expected 'http' or 'https'")]
    InvalidScheme(String),

    /// Transport was neither `stdio` nor `sse`.
    #[error("invalid transport '{0}': expected 'stdio' or 'sse'")]
    InvalidTransport(String),

    /// A numeric environment variable failed to parse.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// URL scheme used to reach the OpenFGA API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiScheme {
    #[default]
    Http,
    Https,
}

impl FromStr for ApiScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(ApiScheme::Http),
            "https" => Ok(ApiScheme::Https),
            other => Err(ConfigError::InvalidScheme(other.to_string())),
        }
    }
}

impl fmt::Display for ApiScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiScheme::Http => f.write_str("http"),
            ApiScheme::Https => f.write_str("https"),
        }
    }
}

/// How the OpenFGA backend is reached and which store/model to target.
///
/// `host` may still be absent here: the bridge starts up regardless and the
/// first tool call surfaces the configuration error instead.
#[derive(Debug, Clone)]
pub struct FgaSettings {
    pub scheme: ApiScheme,
    pub host: Option<String>,
    pub store_id: Option<String>,
    /// Lookup key used when `store_id` is absent.
    pub store_name: Option<String>,
    pub authorization_model_id: Option<String>,
    pub request_timeout: Duration,
}

impl Default for FgaSettings {
    fn default() -> Self {
        Self {
            scheme: ApiScheme::default(),
            host: None,
            store_id: None,
            store_name: None,
            authorization_model_id: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl FgaSettings {
    /// Read settings from the `FGA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let scheme = match env::var("FGA_API_SCHEME") {
            Ok(raw) => raw.parse()?,
            Err(_) => ApiScheme::default(),
        };

        let request_timeout = match env::var("FGA_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidNumber {
                        name: "FGA_REQUEST_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            scheme,
            host: non_empty(env::var("FGA_API_HOST").ok()),
            store_id: non_empty(env::var("FGA_STORE_ID").ok()),
            store_name: non_empty(env::var("FGA_STORE_NAME").ok()),
            authorization_model_id: non_empty(env::var("FGA_AUTHORIZATION_MODEL_ID").ok()),
            request_timeout,
        })
    }

    /// Apply a combined URL override such as `http://localhost:8080`,
    /// splitting scheme and host on the first `://`. A bare host is taken
    /// as-is and leaves the scheme unchanged.
    pub fn apply_url(&mut self, url: &str) -> Result<(), ConfigError> {
        match url.split_once("://") {
            Some((scheme, host)) => {
                self.scheme = scheme.parse()?;
                self.host = non_empty(Some(host.to_string()));
            }
            None => {
                self.host = non_empty(Some(url.to_string()));
            }
        }
        Ok(())
    }

    /// Base URL of the backend API, when a host is configured.
    pub fn api_url(&self) -> Option<String> {
        self.host
            .as_deref()
            .map(|host| format!("{}://{}", self.scheme, host.trim_end_matches('/')))
    }
}

/// Transport the bridge serves on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    /// HTTP server with the SSE bridge endpoints.
    #[default]
    Sse,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Transport::Stdio),
            "sse" => Ok(Transport::Sse),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Sse => f.write_str("sse"),
        }
    }
}

/// Listen settings for the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub transport: Transport,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
