//! Error type for the OpenFGA client.

use thiserror::Error;

/// Errors raised by the OpenFGA client and its provider.
#[derive(Debug, Error)]
pub enum FgaError {
    /// The connection settings are unusable (e.g. no host configured).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A store name was supplied but no store with that name exists.
    #[error("store '{0}' not found")]
    StoreNotFound(String),

    /// No store id was configured and the call did not provide one.
    #[error("no store id configured and none provided")]
    MissingStore,

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never completed (connect failure, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 2xx but the body did not decode.
    #[error("failed to decode response: {0}")]
    Decode(String),
}
