//! HTTP client implementation
//!
//! This module provides the core HTTP client for the SDK: a single request
//! executor with per-attempt timeout and cancellation composition, wrapped
//! in a retry controller that applies jittered exponential backoff and
//! consults the circuit breaker before every attempt.

use crate::batch::normalize_partial;
use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};
use crate::hooks::{RequestInfo, ResponseInfo};
use crate::resilience::{backoff, CircuitBreaker};
use reqwest::{header, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// The HTTP client for making API requests.
///
/// Cloning is cheap; clones share the configuration and the circuit
/// breaker state.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<SdkConfig>,
    breaker: Arc<CircuitBreaker>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // Custom headers may override the defaults
        for (name, value) in &config.custom_headers {
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::try_from(name.as_str()),
                header::HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, value);
            }
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(SdkError::Network)?;

        let breaker = CircuitBreaker::new(config.circuit_breaker.clone());

        Ok(Self {
            client,
            config: Arc::new(config),
            breaker: Arc::new(breaker),
        })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get a reference to this client's circuit breaker
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Build the full URL for an endpoint
    pub fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Make a GET request, parsing the response as JSON
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        cancel: Option<&CancellationToken>,
    ) -> SdkResult<T> {
        let text = self
            .execute_with_retry(Method::GET, path, query, None, cancel)
            .await?;
        self.parse_json(&text)
    }

    /// Make a POST request, parsing the response as JSON
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> SdkResult<T> {
        let body_json = serde_json::to_string(body)?;
        let text = self
            .execute_with_retry(Method::POST, path, query, Some(body_json), cancel)
            .await?;
        self.parse_json(&text)
    }

    /// Make a POST request, returning the raw response body
    pub(crate) async fn post_text<B: Serialize>(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> SdkResult<String> {
        let body_json = serde_json::to_string(body)?;
        self.execute_with_retry(Method::POST, path, query, Some(body_json), cancel)
            .await
    }

    /// Parse a JSON body, unwrapping an array-wrapped single object first
    fn parse_json<T: DeserializeOwned>(&self, text: &str) -> SdkResult<T> {
        let value: Value = serde_json::from_str(text)?;
        Ok(serde_json::from_value(normalize_partial(value))?)
    }

    /// Execute one logical HTTP exchange with retries.
    ///
    /// For each attempt: wait out the backoff delay (racing the cancellation
    /// token), consult the circuit breaker, then run a single attempt.
    /// Success and terminal failures are reported to the breaker; failures
    /// that will be retried are not. Cancellation and circuit rejection end
    /// the sequence immediately.
    async fn execute_with_retry(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<String>,
        cancel: Option<&CancellationToken>,
    ) -> SdkResult<String> {
        let url = self.url(path);
        let mut attempt: u32 = 0;

        loop {
            if attempt > 0 {
                if let Some(token) = cancel {
                    if token.is_cancelled() {
                        return Err(SdkError::Cancelled);
                    }
                }

                let delay = backoff::delay_for_attempt(attempt);
                self.log_warn(&format!(
                    "retrying request (attempt {}/{}), waiting {:?}",
                    attempt, self.config.max_retries, delay
                ));

                match cancel {
                    Some(token) => {
                        tokio::select! {
                            _ = token.cancelled() => return Err(SdkError::Cancelled),
                            _ = sleep(delay) => {}
                        }
                    }
                    None => sleep(delay).await,
                }
            }

            // Circuit rejection aborts the whole sequence, never retried
            self.breaker.check().await?;

            match self
                .execute_once(&method, &url, query, body.as_deref(), cancel)
                .await
            {
                Ok(text) => {
                    self.breaker.record_success().await;
                    return Ok(text);
                }
                Err(SdkError::Cancelled) => {
                    // Not a circuit failure and never retried
                    return Err(SdkError::Cancelled);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    if let Some(hint) = e.retry_after() {
                        self.log_warn(&format!("rate limited, upstream hints {hint}s"));
                    }
                    attempt += 1;
                }
                Err(e) => {
                    self.breaker.record_failure().await;
                    self.log_error(&format!("request failed: {e}"));
                    return Err(e);
                }
            }
        }
    }

    /// Perform exactly one HTTP attempt.
    ///
    /// The network exchange races the external cancellation token; the
    /// per-attempt timeout is enforced by the underlying client and
    /// classified separately from cancellation.
    async fn execute_once(
        &self,
        method: &Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> SdkResult<String> {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(SdkError::Cancelled);
            }
        }

        let attempt = self.send_and_read(method, url, query, body);
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(SdkError::Cancelled),
                    result = attempt => result,
                }
            }
            None => attempt.await,
        }
    }

    async fn send_and_read(
        &self,
        method: &Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&str>,
    ) -> SdkResult<String> {
        if let Some(hooks) = &self.config.hooks {
            let info = RequestInfo {
                url: url.to_string(),
                method: method.to_string(),
                body: body.map(|b| b.to_string()),
            };
            hooks.on_request(&info).await?;
        }

        let mut request = self.client.request(method.clone(), url).query(query);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        if self.config.enable_logging {
            self.log_debug(&format!("request: {method} {url}"));
            if let Some(body) = body {
                self.log_debug(&format!("request body: {body}"));
            }
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let retry_after = parse_retry_after(&response);
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if self.config.enable_logging {
            self.log_debug(&format!("response {}: {text}", status.as_u16()));
        }

        if status.is_success() {
            if let Some(hooks) = &self.config.hooks {
                let info = ResponseInfo {
                    status: status.as_u16(),
                    body: text.clone(),
                };
                hooks.on_response(&info).await?;
            }
            Ok(text)
        } else {
            Err(SdkError::from_response(status.as_u16(), &text, retry_after))
        }
    }

    /// Distinguish the per-attempt timeout from transport failures
    fn map_send_error(&self, e: reqwest::Error) -> SdkError {
        if e.is_timeout() {
            SdkError::Timeout(self.config.timeout)
        } else {
            SdkError::Network(e)
        }
    }

    fn log_debug(&self, message: &str) {
        debug!("{message}");
        if let Some(logger) = &self.config.logger {
            logger.debug(message);
        }
    }

    fn log_warn(&self, message: &str) {
        warn!("{message}");
        if let Some(logger) = &self.config.logger {
            logger.warn(message);
        }
    }

    fn log_error(&self, message: &str) {
        error!("{message}");
        if let Some(logger) = &self.config.logger {
            logger.error(message);
        }
    }
}

/// Parse the numeric `Retry-After` header, when present
fn parse_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}
