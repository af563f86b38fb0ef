//! Error types for the WebDAV provider

use thiserror::Error;

/// WebDAV provider errors
#[derive(Error, Debug)]
pub enum WebDavError {
    /// Server answered with a non-success status
    #[error("WebDAV error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// Request never reached the server
    #[error("Network error: {0}")]
    Network(String),

    /// Local filesystem fault while persisting a transfer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client construction failed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Result type for WebDAV operations
pub type Result<T> = std::result::Result<T, WebDavError>;

impl From<WebDavError> for core_resolver::RemoteError {
    fn from(error: WebDavError) -> Self {
        core_resolver::RemoteError(error.to_string())
    }
}
