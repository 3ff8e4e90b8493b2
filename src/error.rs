//! SDK error types and handling
//!
//! This module provides the error taxonomy for the SDK: one tagged enum
//! covering validation, transport, upstream, circuit-breaker, and
//! cancellation failures, plus the classification logic that maps HTTP
//! responses onto it.

use thiserror::Error;

/// The main error type for the SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Malformed input detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential rejected by the upstream (HTTP 401/403)
    #[error("Authentication failed: {message}")]
    Authentication {
        /// HTTP status that triggered the rejection (401 or 403)
        status: u16,
        /// Upstream-provided message, if any
        message: String,
    },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        /// Upstream retry-after hint in seconds
        retry_after: u64,
        /// Raw response body
        body: String,
    },

    /// HTTP 408 or the per-attempt timeout elapsed
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Transport-level failure (connection reset, DNS, refused)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream server failure (HTTP 5xx)
    #[error("Server error: status {status}")]
    Server {
        /// HTTP status code (500..=599)
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Circuit breaker is open; no network call was made
    #[error("Circuit breaker is open, retry after {retry_after:?}")]
    CircuitOpen {
        /// Configured cooldown before the breaker probes again
        retry_after: std::time::Duration,
    },

    /// External cancellation was triggered
    #[error("Operation cancelled")]
    Cancelled,

    /// Any other non-2xx upstream response
    #[error("API error: status {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Parsed or raw upstream message
        message: String,
        /// Raw response body
        body: String,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Response body could not be deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Base URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Upstream error response body, when the service returns structured errors
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error tag
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

impl SdkError {
    /// Classify a non-2xx response into an error variant.
    ///
    /// `retry_after` is the parsed `Retry-After` header in seconds, only
    /// meaningful for 429 responses.
    pub fn from_response(status: u16, body: &str, retry_after: Option<u64>) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| body.to_string());

        match status {
            401 | 403 => SdkError::Authentication { status, message },
            408 => SdkError::Timeout(std::time::Duration::from_secs(0)),
            429 => SdkError::RateLimited {
                retry_after: retry_after.unwrap_or(60),
                body: body.to_string(),
            },
            500..=599 => SdkError::Server {
                status,
                body: body.to_string(),
            },
            _ => SdkError::Api {
                status,
                message,
                body: body.to_string(),
            },
        }
    }

    /// Check whether another attempt is permitted for this failure
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SdkError::Network(_)
                | SdkError::Timeout(_)
                | SdkError::RateLimited { .. }
                | SdkError::Server { .. }
        )
    }

    /// Get the HTTP status code, if one applies.
    ///
    /// Pure network failures report 0, matching the upstream convention for
    /// requests that never produced a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::Authentication { status, .. } => Some(*status),
            SdkError::RateLimited { .. } => Some(429),
            SdkError::Timeout(_) => Some(408),
            SdkError::Server { status, .. } => Some(*status),
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Network(_) => Some(0),
            _ => None,
        }
    }

    /// Get the retry-after hint in seconds, if the upstream provided one
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            SdkError::RateLimited { retry_after, .. } => Some(*retry_after),
            SdkError::CircuitOpen { retry_after } => Some(retry_after.as_secs()),
            _ => None,
        }
    }
}
