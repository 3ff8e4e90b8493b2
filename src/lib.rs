//! Blacklist Lookup SDK
//!
//! This crate provides a resilient Rust client for the blacklist lookup
//! API: single and bulk phone lookups against the suppression list, and
//! bulk email checks, wired through a retry/backoff engine and a circuit
//! breaker so large operations survive an unstable upstream.
//!
//! # Features
//!
//! - **Automatic retries**: jittered exponential backoff for transient
//!   failures, with a per-status retryability table
//! - **Circuit breaking**: fail fast against a degraded upstream, with a
//!   single half-open probe for recovery
//! - **Auto-batching**: bulk inputs split at 5000 items, submitted
//!   sequentially, and merged into one logical result
//! - **Cancellation**: external cancellation tokens composed with the
//!   per-attempt timeout
//! - **Pluggable observation**: logger, request/response hooks, per-batch
//!   progress callbacks
//! - **Dry-run mode**: shape-correct canned responses with zero network
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use blacklist_sdk::{BlacklistClient, SdkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SdkConfig::new("your-api-key");
//!     let client = BlacklistClient::new(config)?;
//!
//!     // Single lookup
//!     let result = client.phone().lookup("2223334444").await?;
//!     println!("matches: {}", result.results);
//!
//!     // Bulk lookup with automatic batching
//!     let phones: Vec<String> = vec!["2223334444".into(), "9999999999".into()];
//!     let merged = client.phone().lookup_bulk(&phones).await?;
//!     println!("{} numbers, {} suppressed", merged.numbers, merged.matches);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Resilience
//!
//! ```rust,no_run
//! use blacklist_sdk::{BlacklistClient, SdkConfig, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! let config = SdkConfig::new("your-api-key")
//!     .with_max_retries(5)
//!     .with_timeout(Duration::from_secs(10))
//!     .with_circuit_breaker(CircuitBreakerConfig {
//!         failure_threshold: 3,
//!         reset_timeout: Duration::from_secs(30),
//!         on_state_change: None,
//!     });
//! # let _ = blacklist_sdk::BlacklistClient::new(config);
//! ```
//!
//! # Error Handling
//!
//! Every failed operation surfaces exactly one classified [`SdkError`]
//! carrying the kind, HTTP status, and raw response, even when many
//! attempts occurred internally:
//!
//! ```rust,no_run
//! use blacklist_sdk::{BlacklistClient, SdkError};
//!
//! async fn handle(client: &BlacklistClient) {
//!     match client.phone().lookup("2223334444").await {
//!         Ok(result) => println!("code: {}", result.code),
//!         Err(SdkError::RateLimited { retry_after, .. }) => {
//!             eprintln!("rate limited, retry after {retry_after}s")
//!         }
//!         Err(SdkError::CircuitOpen { retry_after }) => {
//!             eprintln!("upstream degraded, cooling down {retry_after:?}")
//!         }
//!         Err(e) => eprintln!("lookup failed: {e}"),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
mod mock;
pub mod resilience;
pub mod resources;
pub mod validation;

// Re-export main types for convenience
pub use batch::{MergedEmailResult, MAX_BATCH_SIZE};
pub use client::HttpClient;
pub use config::{ResponseFormat, SdkConfig, SdkConfigBuilder};
pub use error::{SdkError, SdkResult};
pub use hooks::{
    BulkProgress, Logger, ProgressCallback, RequestHooks, RequestInfo, ResponseInfo,
    TracingLogger,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, StateChangeFn};
pub use resources::email::{
    EmailCheckPartial, EmailCheckRequest, EmailClient, EmailHashCheckRequest,
};
pub use resources::phone::{
    BulkLookupRequest, BulkLookupResponse, LookupResponse, PhoneClient, SuppressedNumber,
};
pub use resources::{BulkOptions, BulkUrlStyle, CallOptions};

use std::sync::Arc;

/// The main client for the blacklist lookup API.
///
/// Provides access to the phone and email resources through dedicated
/// sub-clients. Retries, circuit breaking, batching, and error
/// classification are handled automatically; the circuit breaker state is
/// owned by this instance and never shared across instances.
///
/// # Example
///
/// ```rust,no_run
/// use blacklist_sdk::{BlacklistClient, SdkConfig};
///
/// # fn example() -> Result<(), blacklist_sdk::SdkError> {
/// let client = BlacklistClient::new(SdkConfig::new("your-api-key"))?;
///
/// let phone = client.phone();
/// let email = client.email();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BlacklistClient {
    http_client: Arc<HttpClient>,
    phone: PhoneClient,
    email: EmailClient,
}

impl BlacklistClient {
    /// Create a new client with the given configuration.
    ///
    /// Returns an error if the configuration is invalid (missing API key,
    /// malformed base URL, zero timeout).
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        let http_client = Arc::new(HttpClient::new(config)?);

        Ok(Self {
            phone: PhoneClient::new(Arc::clone(&http_client)),
            email: EmailClient::new(Arc::clone(&http_client)),
            http_client,
        })
    }

    /// Create a new client using a builder pattern.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use blacklist_sdk::BlacklistClient;
    /// use std::time::Duration;
    ///
    /// let client = BlacklistClient::builder("your-api-key")
    ///     .with_timeout(Duration::from_secs(30))
    ///     .with_max_retries(3)
    ///     .build()?;
    /// # Ok::<(), blacklist_sdk::SdkError>(())
    /// ```
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Get the phone client for lookups against the suppression list
    pub fn phone(&self) -> &PhoneClient {
        &self.phone
    }

    /// Get the email client for bulk email checks
    pub fn email(&self) -> &EmailClient {
        &self.email
    }

    /// Get a reference to the underlying HTTP client
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.http_client.config().base_url
    }
}

/// Builder for creating a [`BlacklistClient`] with fluent configuration
pub struct ClientBuilder {
    config_builder: SdkConfigBuilder,
}

impl ClientBuilder {
    /// Create a new client builder with the given access credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config_builder: SdkConfig::builder(api_key),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Set the per-attempt request timeout
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config_builder = self.config_builder.max_retries(max_retries);
        self
    }

    /// Enable or disable request/response logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config_builder = self.config_builder.logging(enable);
        self
    }

    /// Enable or disable automatic batching of bulk inputs
    pub fn with_batching(mut self, enable: bool) -> Self {
        self.config_builder = self.config_builder.batching(enable);
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self, enable: bool) -> Self {
        self.config_builder = self.config_builder.dry_run(enable);
        self
    }

    /// Configure the circuit breaker
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.config_builder = self.config_builder.circuit_breaker(config);
        self
    }

    /// Add a custom header to all requests
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.header(name, value);
        self
    }

    /// Build the client
    pub fn build(self) -> SdkResult<BlacklistClient> {
        BlacklistClient::new(self.config_builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let result = BlacklistClient::builder("test-key")
            .with_timeout(std::time::Duration::from_secs(30))
            .with_max_retries(3)
            .with_logging(true)
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn test_client_new_requires_api_key() {
        assert!(BlacklistClient::new(SdkConfig::default()).is_err());
        assert!(BlacklistClient::new(SdkConfig::new("key")).is_ok());
    }

    #[test]
    fn test_client_resource_access() {
        let client = BlacklistClient::new(SdkConfig::new("key")).unwrap();

        let _ = client.phone();
        let _ = client.email();
        let _ = client.http_client();
        assert!(client.base_url().starts_with("https://"));
    }
}
