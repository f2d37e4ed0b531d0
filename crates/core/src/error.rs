//! Error types for the Homie domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Homie operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Drive sync errors ---
    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    // --- Request validation ---
    #[error("Validation error: {0}")]
    Validation(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// The provider signalled exhausted quota or rate limits. Surfaced to
    /// callers as retryable (503); never retried internally.
    #[error("Provider capacity exhausted, retry after {retry_after_secs}s")]
    CapacityExhausted { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    /// An update named a category key outside the closed set. Deliberately
    /// a hard error rather than a silent fallback to a default category.
    #[error("Unknown knowledge category: {0:?}")]
    UnknownCategory(String),

    #[error("Knowledge content must not be empty")]
    EmptyContent,

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Drive credentials not configured")]
    NotConfigured,

    #[error("Drive API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Failed to extract text from {file_name}: {reason}")]
    ExtractionFailed { file_name: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn unknown_category_names_the_key() {
        let err = Error::Knowledge(KnowledgeError::UnknownCategory("bogus".into()));
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn drive_extraction_error_names_the_file() {
        let err = DriveError::ExtractionFailed {
            file_name: "buybox.pdf".into(),
            reason: "unsupported format".into(),
        };
        assert!(err.to_string().contains("buybox.pdf"));
    }
}
