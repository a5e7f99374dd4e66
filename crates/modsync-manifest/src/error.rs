//! Error types for manifest operations

use thiserror::Error;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or interpreting manifests
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File path escapes the install directory or is empty
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// SHA-1 digest is not 40 hex characters
    #[error("Invalid SHA-1 digest for {name}: {digest:?}")]
    InvalidDigest { name: String, digest: String },

    /// File has neither a URL nor a CurseForge reference
    #[error("No download URL for {name}")]
    MissingUrl { name: String },

    /// Modpack lists no versions
    #[error("Modpack {modpack_id} has no versions")]
    NoVersions { modpack_id: i64 },
}

impl Error {
    /// Check if this error came from talking to the API
    pub fn is_network_error(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. })
    }
}
