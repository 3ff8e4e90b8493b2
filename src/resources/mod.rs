//! Resource clients for the upstream API surface

pub mod email;
pub mod phone;

use crate::hooks::ProgressCallback;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Options for a single-item operation
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// External cancellation token; once triggered, the operation fails
    /// with a cancellation error and no further attempts are made
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// URL style for bulk phone lookups; the two styles are equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkUrlStyle {
    /// Credential and version travel as query parameters
    #[default]
    Query,
    /// Credential and version travel as path segments
    Path,
}

/// Options for a bulk operation
#[derive(Clone, Default)]
pub struct BulkOptions {
    /// External cancellation token shared by every batch
    pub cancel: Option<CancellationToken>,
    /// Invoked after each completed batch with cumulative progress
    pub on_progress: Option<ProgressCallback>,
    /// URL style for bulk phone lookups (ignored by email checks)
    pub url_style: BulkUrlStyle,
}

impl fmt::Debug for BulkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkOptions")
            .field("cancel", &self.cancel)
            .field("on_progress", &self.on_progress.is_some())
            .field("url_style", &self.url_style)
            .finish()
    }
}

impl BulkOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a progress callback
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Select the bulk URL style
    pub fn with_url_style(mut self, style: BulkUrlStyle) -> Self {
        self.url_style = style;
        self
    }
}
