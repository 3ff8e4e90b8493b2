//! Pluggable logger, request hooks, and progress reporting
//!
//! Caller-supplied observation points are modeled as capability traits with
//! default no-op methods: implementations may override any subset, and an
//! unimplemented method simply does nothing.

use crate::error::SdkResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Pluggable logging sink with four severity levels.
///
/// Every method defaults to a no-op, so partial implementations are valid.
pub trait Logger: Send + Sync {
    /// Verbose diagnostics (request/response bodies, retry decisions)
    fn debug(&self, _message: &str) {}
    /// Notable lifecycle events
    fn info(&self, _message: &str) {}
    /// Recoverable problems (retries, rate limits)
    fn warn(&self, _message: &str) {}
    /// Terminal failures
    fn error(&self, _message: &str) {}
}

/// Default logger that forwards to the `tracing` macros
#[derive(Debug, Clone, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Context handed to [`RequestHooks::on_request`] before a request is sent
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Full request URL, including query parameters
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Serialized request body, when one is present
    pub body: Option<String>,
}

/// Context handed to [`RequestHooks::on_response`] after a successful response
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

/// Observation hooks invoked around each HTTP attempt.
///
/// Both methods are awaited before the request proceeds; an error returned
/// from a hook propagates to the caller.
#[async_trait]
pub trait RequestHooks: Send + Sync {
    /// Called before each attempt is sent
    async fn on_request(&self, _request: &RequestInfo) -> SdkResult<()> {
        Ok(())
    }

    /// Called after each successful (2xx) response
    async fn on_response(&self, _response: &ResponseInfo) -> SdkResult<()> {
        Ok(())
    }
}

/// Progress of a bulk operation, reported after each completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkProgress {
    /// Cumulative number of items processed so far
    pub completed: usize,
    /// 1-based index of the batch that just completed
    pub batch: usize,
    /// Total number of batches in this operation
    pub total_batches: usize,
}

/// Callback invoked after each completed batch of a bulk operation
pub type ProgressCallback = Arc<dyn Fn(BulkProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Partial {
        warnings: Mutex<Vec<String>>,
    }

    impl Logger for Partial {
        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_partial_logger_defaults_are_noops() {
        let logger = Partial {
            warnings: Mutex::new(Vec::new()),
        };

        logger.debug("ignored");
        logger.info("ignored");
        logger.error("ignored");
        logger.warn("kept");

        assert_eq!(*logger.warnings.lock().unwrap(), vec!["kept".to_string()]);
    }

    #[tokio::test]
    async fn test_default_hooks_are_noops() {
        struct NoOverrides;
        impl RequestHooks for NoOverrides {}

        let hooks = NoOverrides;
        let request = RequestInfo {
            url: "https://api.example.com/lookup".to_string(),
            method: "GET".to_string(),
            body: None,
        };
        let response = ResponseInfo {
            status: 200,
            body: "{}".to_string(),
        };

        assert!(hooks.on_request(&request).await.is_ok());
        assert!(hooks.on_response(&response).await.is_ok());
    }
}
