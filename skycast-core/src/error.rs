//! Error types for Skycast.
//!
//! The cache itself never fails: a missing or expired key is `None`. Every
//! variant here originates from the provider clients, configuration, or
//! request validation.

use thiserror::Error;

/// Result type alias using `SkycastError`.
pub type Result<T> = std::result::Result<T, SkycastError>;

/// Main error type for all Skycast operations.
#[derive(Debug, Error)]
pub enum SkycastError {
    // ═══════════════════════════════════════════════════════════════════════════
    // REQUEST ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// City name failed validation.
    #[error("Invalid city name: {0}")]
    InvalidCity(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The provider does not know this city.
    #[error("City \"{0}\" not found")]
    CityNotFound(String),

    /// The provider rejected our credentials.
    #[error("Weather provider rejected the API key")]
    Unauthorized,

    /// The provider answered with an unexpected status.
    #[error("Weather provider returned HTTP {status}")]
    UpstreamStatus {
        /// HTTP status code
        status: u16,
    },

    /// The provider did not answer in time.
    #[error("Weather provider timeout after {seconds}s")]
    Timeout {
        /// Configured timeout
        seconds: u64,
    },

    /// Could not connect to the provider.
    #[error("Connection to weather provider failed: {0}")]
    Connection(String),

    /// Any other transport failure.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The provider answered 200 with a body we could not interpret.
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SkycastError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SkycastError::Timeout { .. }
                | SkycastError::Connection(_)
                | SkycastError::HttpError(_)
        ) || matches!(self, SkycastError::UpstreamStatus { status } if *status >= 500)
    }

    /// Returns true if the failure came from the weather provider.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            SkycastError::CityNotFound(_)
                | SkycastError::Unauthorized
                | SkycastError::UpstreamStatus { .. }
                | SkycastError::Timeout { .. }
                | SkycastError::Connection(_)
                | SkycastError::HttpError(_)
                | SkycastError::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkycastError::Timeout { seconds: 10 };
        assert_eq!(err.to_string(), "Weather provider timeout after 10s");

        let err = SkycastError::CityNotFound("Atlantis".into());
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_error_classification() {
        assert!(SkycastError::Timeout { seconds: 5 }.is_recoverable());
        assert!(SkycastError::UpstreamStatus { status: 503 }.is_recoverable());
        assert!(!SkycastError::UpstreamStatus { status: 429 }.is_recoverable());
        assert!(!SkycastError::Unauthorized.is_recoverable());

        assert!(SkycastError::CityNotFound("x".into()).is_upstream_error());
        assert!(!SkycastError::ConfigError("x".into()).is_upstream_error());
    }
}
