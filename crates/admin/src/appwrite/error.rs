//! Error types for the Appwrite client.

use thiserror::Error;

/// Errors that can occur when talking to the Appwrite Databases API.
#[derive(Debug, Error)]
pub enum AppwriteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Appwrite returned an error response.
    #[error("API error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    /// Document or collection does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or insufficient credentials/permissions.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by Appwrite.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Client could not be constructed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Error body returned by Appwrite.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: u16,
    #[serde(rename = "type", default)]
    pub error_type: String,
}
