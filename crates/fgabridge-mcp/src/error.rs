//! Error types for the MCP crate.

use thiserror::Error;

/// Errors that can occur while running the bridge server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start a transport.
    #[error("failed to start server: {0}")]
    StartupFailed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
