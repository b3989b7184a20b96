/// Error types for the harvester.
///
/// `ApiError` covers everything that can go wrong talking to the Netatmo
/// API. `HarvestError` is the crate-level error returned by configuration,
/// CSV and pipeline functions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network request failed for {0}")]
    Request(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}: {body}")]
    HttpStatus { url: String, status: u16, body: String },

    /// Well-formed JSON carrying an upstream error object or a non-ok status.
    #[error("Netatmo API error {code}: {message}")]
    Upstream { code: i64, message: String },

    #[error("Failed to parse JSON response")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("Invalid date/time '{0}' (expected YYYYMMDD and HHMM)")]
    InvalidTimestamp(String),

    #[error("Failed to access '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("CSV error in '{0}'")]
    Csv(PathBuf, #[source] csv::Error),
}
