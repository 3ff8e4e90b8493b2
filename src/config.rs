//! SDK configuration
//!
//! This module provides configuration options for the SDK client.

use crate::error::{SdkError, SdkResult};
use crate::hooks::{Logger, RequestHooks};
use crate::resilience::CircuitBreakerConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Response format requested from the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Structured JSON; bulk responses can be merged across batches
    #[default]
    Json,
    /// Raw text; bulk responses cannot be merged, so auto-batching is skipped
    Text,
}

impl ResponseFormat {
    /// Query-parameter value for the format selector
    pub fn as_query_value(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Text => "text",
        }
    }

    /// Whether per-batch responses of this format can be merged
    pub fn is_mergeable(&self) -> bool {
        matches!(self, ResponseFormat::Json)
    }
}

/// Configuration for the SDK client
#[derive(Clone)]
pub struct SdkConfig {
    /// Base URL for the API
    pub base_url: String,

    /// Access credential, sent with every request (required)
    pub api_key: String,

    /// API protocol version segment
    pub version: String,

    /// Response format selector
    pub response_format: ResponseFormat,

    /// Per-attempt request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum number of retries after the first attempt
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,

    /// Enable request/response body logging
    pub enable_logging: bool,

    /// Split bulk inputs into batches automatically
    pub batching: bool,

    /// Bypass the network and return canned shape-correct data
    pub dry_run: bool,

    /// Custom headers added to all requests
    pub custom_headers: Vec<(String, String)>,

    /// Circuit breaker settings; `None` disables the breaker
    pub circuit_breaker: Option<CircuitBreakerConfig>,

    /// Pluggable logging sink
    pub logger: Option<Arc<dyn Logger>>,

    /// Pluggable pre/post-request hooks
    pub hooks: Option<Arc<dyn RequestHooks>>,
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("version", &self.version)
            .field("response_format", &self.response_format)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field("enable_logging", &self.enable_logging)
            .field("batching", &self.batching)
            .field("dry_run", &self.dry_run)
            .field("custom_headers", &self.custom_headers)
            .field("circuit_breaker", &self.circuit_breaker)
            .field("logger", &self.logger.is_some())
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.blacklist-lookup.io".to_string(),
            api_key: String::new(),
            version: "v3".to_string(),
            response_format: ResponseFormat::Json,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            user_agent: format!("blacklist-sdk/{}", env!("CARGO_PKG_VERSION")),
            enable_logging: false,
            batching: true,
            dry_run: false,
            custom_headers: Vec::new(),
            circuit_breaker: None,
            logger: None,
            hooks: None,
        }
    }
}

impl SdkConfig {
    /// Create a new configuration with the given access credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create a new builder with the given access credential
    pub fn builder(api_key: impl Into<String>) -> SdkConfigBuilder {
        SdkConfigBuilder {
            config: Self::new(api_key),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API protocol version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the response format selector
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Set the per-attempt request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable request/response logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Enable or disable automatic batching of bulk inputs
    pub fn with_batching(mut self, enable: bool) -> Self {
        self.batching = enable;
        self
    }

    /// Enable dry-run mode: no network, canned responses
    pub fn with_dry_run(mut self, enable: bool) -> Self {
        self.dry_run = enable;
        self
    }

    /// Add a custom header to all requests
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Configure the circuit breaker
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(config);
        self
    }

    /// Set the pluggable logger
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the pre/post-request hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> SdkResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(SdkError::Configuration(
                "API key cannot be empty".to_string(),
            ));
        }

        if self.base_url.is_empty() {
            return Err(SdkError::Configuration(
                "Base URL cannot be empty".to_string(),
            ));
        }

        url::Url::parse(&self.base_url)?;

        if self.timeout.is_zero() {
            return Err(SdkError::Configuration(
                "Timeout cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for SDK configuration
pub struct SdkConfigBuilder {
    config: SdkConfig,
}

impl SdkConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API protocol version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the response format selector
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.config.response_format = format;
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Enable logging
    pub fn logging(mut self, enable: bool) -> Self {
        self.config.enable_logging = enable;
        self
    }

    /// Enable or disable automatic batching
    pub fn batching(mut self, enable: bool) -> Self {
        self.config.batching = enable;
        self
    }

    /// Enable dry-run mode
    pub fn dry_run(mut self, enable: bool) -> Self {
        self.config.dry_run = enable;
        self
    }

    /// Add a custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Configure the circuit breaker
    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.config.circuit_breaker = Some(config);
        self
    }

    /// Set the pluggable logger
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.config.logger = Some(logger);
        self
    }

    /// Set the pre/post-request hooks
    pub fn hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.config.hooks = Some(hooks);
        self
    }

    /// Build the configuration
    pub fn build(self) -> SdkConfig {
        self.config
    }
}
