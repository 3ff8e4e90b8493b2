//! Email check resource client
//!
//! Bulk email checks against the upstream suppression service. The
//! upstream only ever reports the "good" subset; the "bad" side is derived
//! locally by the merger. Addresses can be submitted in the clear or as
//! MD5 hashes.

use crate::batch::{chunk, merge_email, MergedEmailResult, MAX_BATCH_SIZE};
use crate::client::HttpClient;
use crate::error::{SdkError, SdkResult};
use crate::hooks::BulkProgress;
use crate::mock;
use crate::resources::BulkOptions;
use crate::validation::{email_md5, validate_email};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Client for email check operations
#[derive(Debug, Clone)]
pub struct EmailClient {
    client: Arc<HttpClient>,
}

impl EmailClient {
    /// Create a new email client
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

    /// Check whether a single address is clean
    pub async fn is_clean(&self, email: &str) -> SdkResult<bool> {
        let result = self.check_bulk(&[email.to_string()]).await?;
        Ok(result.bad.is_empty())
    }

    /// Check a list of addresses in bulk
    pub async fn check_bulk(&self, emails: &[String]) -> SdkResult<MergedEmailResult> {
        self.check_bulk_with(emails, &BulkOptions::default()).await
    }

    /// Check a list of addresses in bulk, with options.
    ///
    /// Inputs are batched at 5000 addresses, batches run strictly
    /// sequentially, and the merged result derives `bad` as every submitted
    /// address the upstream did not report good (case-insensitive).
    pub async fn check_bulk_with(
        &self,
        emails: &[String],
        options: &BulkOptions,
    ) -> SdkResult<MergedEmailResult> {
        self.check_batches(emails, options, |batch| EmailCheckRequest {
            emails: batch,
        })
        .await
    }

    /// Check a list of addresses in bulk, submitting MD5 hashes.
    ///
    /// Addresses never leave the process in the clear; the upstream reports
    /// good hashes, which are mapped back to the submitted addresses before
    /// merging.
    pub async fn check_bulk_hashed(
        &self,
        emails: &[String],
        options: &BulkOptions,
    ) -> SdkResult<MergedEmailResult> {
        self.validate_input(emails)?;

        if self.client.config().dry_run {
            return Ok(mock::email_check(emails));
        }

        let hash_to_email: HashMap<String, String> = emails
            .iter()
            .map(|e| (email_md5(e), e.clone()))
            .collect();
        let hashes: Vec<String> = emails.iter().map(|e| email_md5(e)).collect();

        let good_parts = self
            .run_batches(&hashes, options, |batch| EmailHashCheckRequest {
                hashes: batch,
            })
            .await?;

        // Map good hashes back to the addresses that produced them
        let good_emails = good_parts
            .into_iter()
            .map(|part| {
                part.into_iter()
                    .filter_map(|hash| hash_to_email.get(&hash).cloned())
                    .collect()
            })
            .collect();

        Ok(merge_email(good_emails, emails))
    }

    /// Check a list of precomputed MD5 hashes in bulk.
    ///
    /// For callers that hash addresses themselves. The result's `good` and
    /// `bad` sides contain hashes, since the originals are not known here.
    pub async fn check_hashes(
        &self,
        hashes: &[String],
        options: &BulkOptions,
    ) -> SdkResult<MergedEmailResult> {
        if hashes.is_empty() {
            return Err(SdkError::Validation(
                "bulk email check requires at least one hash".to_string(),
            ));
        }
        for hash in hashes {
            if hash.len() != 32 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(SdkError::Validation(format!("invalid MD5 hash: {hash}")));
            }
        }

        if self.client.config().dry_run {
            return Ok(mock::email_check(hashes));
        }

        let good_parts = self
            .run_batches(hashes, options, |batch| EmailHashCheckRequest {
                hashes: batch,
            })
            .await?;
        Ok(merge_email(good_parts, hashes))
    }

    fn validate_input(&self, emails: &[String]) -> SdkResult<()> {
        if emails.is_empty() {
            return Err(SdkError::Validation(
                "bulk email check requires at least one address".to_string(),
            ));
        }
        for email in emails {
            validate_email(email)?;
        }
        Ok(())
    }

    async fn check_batches<B, F>(
        &self,
        emails: &[String],
        options: &BulkOptions,
        make_body: F,
    ) -> SdkResult<MergedEmailResult>
    where
        B: Serialize,
        F: Fn(Vec<String>) -> B,
    {
        self.validate_input(emails)?;

        if self.client.config().dry_run {
            return Ok(mock::email_check(emails));
        }

        let good_parts = self.run_batches(emails, options, make_body).await?;
        Ok(merge_email(good_parts, emails))
    }

    /// Submit `items` in sequential batches, collecting per-batch good lists
    async fn run_batches<B, F>(
        &self,
        items: &[String],
        options: &BulkOptions,
        make_body: F,
    ) -> SdkResult<Vec<Vec<String>>>
    where
        B: Serialize,
        F: Fn(Vec<String>) -> B,
    {
        let query = self.base_query();
        let batches = if self.client.config().batching {
            chunk(items, MAX_BATCH_SIZE)
        } else {
            vec![items.to_vec()]
        };
        let total_batches = batches.len();

        let mut good_parts = Vec::with_capacity(total_batches);
        let mut completed = 0;
        for (index, batch) in batches.into_iter().enumerate() {
            let batch_len = batch.len();
            let body = make_body(batch);
            let partial: EmailCheckPartial = self
                .client
                .post_json("/checkemail", &query, &body, options.cancel.as_ref())
                .await?;

            completed += batch_len;
            if let Some(on_progress) = &options.on_progress {
                on_progress(BulkProgress {
                    completed,
                    batch: index + 1,
                    total_batches,
                });
            }
            good_parts.push(partial.good);
        }

        Ok(good_parts)
    }
}

/// Request body for a clear-text email check
#[derive(Debug, Clone, Serialize)]
pub struct EmailCheckRequest {
    /// Addresses for this batch
    pub emails: Vec<String>,
}

/// Request body for a hashed email check
#[derive(Debug, Clone, Serialize)]
pub struct EmailHashCheckRequest {
    /// MD5 hashes of case-normalized addresses for this batch
    pub hashes: Vec<String>,
}

/// One batch's response: the upstream only reports the good side
#[derive(Debug, Clone, Deserialize)]
pub struct EmailCheckPartial {
    /// Addresses (or hashes) the upstream accepted
    #[serde(default)]
    pub good: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SdkConfig;

    fn dry_run_client() -> EmailClient {
        let config = SdkConfig::new("test-key").with_dry_run(true);
        EmailClient::new(Arc::new(HttpClient::new(config).unwrap()))
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let client = dry_run_client();
        assert!(matches!(
            client.check_bulk(&[]).await,
            Err(SdkError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_io() {
        let client = dry_run_client();
        let result = client
            .check_bulk(&["a@x.com".to_string(), "not-an-email".to_string()])
            .await;
        assert!(matches!(result, Err(SdkError::Validation(_))));
    }

    #[tokio::test]
    async fn test_dry_run_reports_all_good() {
        let client = dry_run_client();
        let emails = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        let result = client.check_bulk(&emails).await.unwrap();

        assert_eq!(result.good, emails);
        assert!(result.bad.is_empty());
        assert!(client.is_clean("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_rejected() {
        let client = dry_run_client();
        let result = client
            .check_hashes(&["nothex".to_string()], &BulkOptions::default())
            .await;
        assert!(matches!(result, Err(SdkError::Validation(_))));
    }

    #[test]
    fn test_partial_defaults_good_to_empty() {
        let partial: EmailCheckPartial = serde_json::from_str("{}").unwrap();
        assert!(partial.good.is_empty());
    }
}
