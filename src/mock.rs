//! Canned responses for dry-run mode
//!
//! Shape-correct data returned when `dry_run` is set; no network call is
//! ever made. Every mock reports clean results.

use crate::batch::MergedEmailResult;
use crate::resources::phone::{BulkLookupResponse, LookupResponse};

/// Canned single lookup response
pub(crate) fn lookup(phone: &str) -> LookupResponse {
    LookupResponse {
        status: "success".to_string(),
        code: String::new(),
        message: format!("{phone} is not on the suppression list"),
        results: 0,
        wireless: false,
    }
}

/// Canned bulk lookup response
pub(crate) fn bulk_lookup(phones: &[String]) -> BulkLookupResponse {
    BulkLookupResponse {
        numbers: phones.len() as u64,
        matches: 0,
        clean: phones.len() as u64,
        suppressed: Vec::new(),
        codes: Default::default(),
    }
}

/// Canned email check result: everything submitted is good
pub(crate) fn email_check(emails: &[String]) -> MergedEmailResult {
    MergedEmailResult {
        good: emails.to_vec(),
        bad: Vec::new(),
    }
}
