//! Custom error types for rustaltmetric.
//!
//! All fallible operations return `Result<T, AltmetricError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustaltmetric operations.
#[derive(Debug, Error)]
pub enum AltmetricError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Listing page could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Remote API returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// Badge URL did not match the donut image pattern
    #[error("Badge URL for record {record_id} is not a donut image URL: {url:?}")]
    BadgeUrl {
        /// Altmetric ID of the offending record
        record_id: String,
        /// The badge URL as received
        url: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `AltmetricError`
pub type Result<T> = std::result::Result<T, AltmetricError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AltmetricError::Parse(msg.to_string()))
    }
}
