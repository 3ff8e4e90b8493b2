//! Phone lookup resource client
//!
//! Single-number lookups and auto-batched bulk lookups against the
//! suppression list.

use crate::batch::{chunk, merge_bulk, MAX_BATCH_SIZE};
use crate::client::HttpClient;
use crate::error::{SdkError, SdkResult};
use crate::hooks::BulkProgress;
use crate::mock;
use crate::resources::{BulkOptions, BulkUrlStyle, CallOptions};
use crate::validation::validate_phone;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Client for phone lookup operations
#[derive(Debug, Clone)]
pub struct PhoneClient {
    client: Arc<HttpClient>,
}

impl PhoneClient {
    /// Create a new phone client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    fn base_query(&self) -> Vec<(String, String)> {
        let config = self.client.config();
        vec![
            ("key".to_string(), config.api_key.clone()),
            ("ver".to_string(), config.version.clone()),
            (
                "resp".to_string(),
                config.response_format.as_query_value().to_string(),
            ),
        ]
    }

    /// Look up a single phone number
    pub async fn lookup(&self, phone: &str) -> SdkResult<LookupResponse> {
        self.lookup_with(phone, &CallOptions::default()).await
    }

    /// Look up a single phone number with call options
    pub async fn lookup_with(
        &self,
        phone: &str,
        options: &CallOptions,
    ) -> SdkResult<LookupResponse> {
        let digits = validate_phone(phone)?;

        if self.client.config().dry_run {
            return Ok(mock::lookup(&digits));
        }

        let mut query = self.base_query();
        query.push(("phone".to_string(), digits));
        self.client
            .get_json("/lookup", &query, options.cancel.as_ref())
            .await
    }

    /// Check whether a phone number is on the suppression list
    pub async fn is_blacklisted(&self, phone: &str) -> SdkResult<bool> {
        Ok(self.lookup(phone).await?.results > 0)
    }

    /// Get the suppression reason code for a number, if it is listed
    pub async fn blacklist_reason(&self, phone: &str) -> SdkResult<Option<String>> {
        let response = self.lookup(phone).await?;
        if response.results > 0 {
            Ok(Some(response.code))
        } else {
            Ok(None)
        }
    }

    /// Look up a list of phone numbers in bulk
    pub async fn lookup_bulk(&self, phones: &[String]) -> SdkResult<BulkLookupResponse> {
        self.lookup_bulk_with(phones, &BulkOptions::default()).await
    }

    /// Look up a list of phone numbers in bulk, with options.
    ///
    /// Inputs longer than the batch limit are split into contiguous batches
    /// of at most 5000 numbers, submitted strictly sequentially, and the
    /// per-batch responses merged into one logical result. The progress
    /// callback fires after each completed batch with cumulative counts.
    ///
    /// Requires the JSON response format; raw text responses cannot be
    /// merged across batches, use [`lookup_bulk_raw`](Self::lookup_bulk_raw)
    /// for those.
    pub async fn lookup_bulk_with(
        &self,
        phones: &[String],
        options: &BulkOptions,
    ) -> SdkResult<BulkLookupResponse> {
        if phones.is_empty() {
            return Err(SdkError::Validation(
                "bulk lookup requires at least one phone number".to_string(),
            ));
        }

        let normalized = phones
            .iter()
            .map(|p| validate_phone(p))
            .collect::<SdkResult<Vec<_>>>()?;

        let config = self.client.config();
        if config.dry_run {
            return Ok(mock::bulk_lookup(&normalized));
        }

        if !config.response_format.is_mergeable() {
            return Err(SdkError::Configuration(
                "text responses cannot be merged across batches; use lookup_bulk_raw"
                    .to_string(),
            ));
        }

        let (path, query) = self.bulk_target(options.url_style);

        let batches = if config.batching {
            chunk(&normalized, MAX_BATCH_SIZE)
        } else {
            vec![normalized]
        };
        let total_batches = batches.len();

        let mut partials = Vec::with_capacity(total_batches);
        let mut completed = 0;
        for (index, batch) in batches.into_iter().enumerate() {
            let batch_len = batch.len();
            let body = BulkLookupRequest { phones: batch };
            let partial: BulkLookupResponse = self
                .client
                .post_json(&path, &query, &body, options.cancel.as_ref())
                .await?;

            completed += batch_len;
            if let Some(on_progress) = &options.on_progress {
                on_progress(BulkProgress {
                    completed,
                    batch: index + 1,
                    total_batches,
                });
            }
            partials.push(partial);
        }

        Ok(merge_bulk(partials))
    }

    /// Look up a list of phone numbers in bulk, returning the raw body.
    ///
    /// Used with text-like response formats. The whole list is submitted as
    /// one request; auto-batching is skipped because raw responses cannot
    /// be merged.
    pub async fn lookup_bulk_raw(
        &self,
        phones: &[String],
        options: &BulkOptions,
    ) -> SdkResult<String> {
        if phones.is_empty() {
            return Err(SdkError::Validation(
                "bulk lookup requires at least one phone number".to_string(),
            ));
        }

        let normalized = phones
            .iter()
            .map(|p| validate_phone(p))
            .collect::<SdkResult<Vec<_>>>()?;

        if self.client.config().dry_run {
            return Ok(serde_json::to_string(&mock::bulk_lookup(&normalized))?);
        }

        let (path, query) = self.bulk_target(options.url_style);
        let body = BulkLookupRequest { phones: normalized };
        self.client
            .post_text(&path, &query, &body, options.cancel.as_ref())
            .await
    }

    /// Resolve the bulk endpoint path and query for a URL style
    fn bulk_target(&self, style: BulkUrlStyle) -> (String, Vec<(String, String)>) {
        let config = self.client.config();
        match style {
            BulkUrlStyle::Query => ("/bulklookup".to_string(), self.base_query()),
            BulkUrlStyle::Path => (
                format!("/bulklookup/key/{}/ver/{}", config.api_key, config.version),
                vec![(
                    "resp".to_string(),
                    config.response_format.as_query_value().to_string(),
                )],
            ),
        }
    }
}

/// Request body for a bulk lookup
#[derive(Debug, Clone, Serialize)]
pub struct BulkLookupRequest {
    /// Normalized phone numbers for this batch
    pub phones: Vec<String>,
}

/// Response to a single phone lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Upstream status tag
    #[serde(default)]
    pub status: String,
    /// Suppression reason code; empty when the number is clean
    #[serde(default)]
    pub code: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Number of suppression list matches for this number
    #[serde(default)]
    pub results: u64,
    /// Whether the number is a wireless line
    #[serde(default)]
    pub wireless: bool,
}

/// One suppressed number in a bulk lookup response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedNumber {
    /// The suppressed phone number
    pub phone: String,
    /// Suppression reason code
    #[serde(default)]
    pub code: String,
    /// Human-readable reason
    #[serde(default)]
    pub reason: String,
}

/// Response to a bulk lookup, either one batch's partial or the merged whole
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkLookupResponse {
    /// Total numbers processed
    #[serde(default)]
    pub numbers: u64,
    /// Numbers found on the suppression list
    #[serde(default)]
    pub matches: u64,
    /// Numbers not found on the suppression list
    #[serde(default)]
    pub clean: u64,
    /// Suppressed numbers with their reason codes, in submission order
    #[serde(default)]
    pub suppressed: Vec<SuppressedNumber>,
    /// Map from suppressed number to reason code
    #[serde(default)]
    pub codes: HashMap<String, String>,
}
