//! Input validation and hashing helpers
//!
//! Stateless checks raised before any network call, plus the MD5 helper
//! used for privacy-preserving email submission.

use crate::error::{SdkError, SdkResult};
use md5::{Digest, Md5};

/// Validate a phone number: 10 digits, or 11 with a leading country code 1.
///
/// Common separators (`+`, `-`, `.`, spaces, parentheses) are tolerated and
/// stripped before checking. Returns the bare digit string.
pub fn validate_phone(phone: &str) -> SdkResult<String> {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | '.' | ' ' | '(' | ')'))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(SdkError::Validation(format!(
            "invalid phone number: {phone}"
        )));
    }

    match digits.len() {
        10 => Ok(digits),
        11 if digits.starts_with('1') => Ok(digits[1..].to_string()),
        _ => Err(SdkError::Validation(format!(
            "phone number must have 10 digits: {phone}"
        ))),
    }
}

/// Validate an email address: one `@`, non-empty local part, and a domain
/// containing a dot.
pub fn validate_email(email: &str) -> SdkResult<()> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next();

    match domain {
        Some(domain)
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err(SdkError::Validation(format!("invalid email: {email}"))),
    }
}

/// MD5 hash of a case-normalized email address, hex-encoded.
///
/// Addresses are lowercased before hashing so the upstream's
/// case-insensitive matching carries over to the hashed form.
pub fn email_md5(email: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone_formats() {
        assert_eq!(validate_phone("2223334444").unwrap(), "2223334444");
        assert_eq!(validate_phone("12223334444").unwrap(), "2223334444");
        assert_eq!(validate_phone("+1 (222) 333-4444").unwrap(), "2223334444");
        assert_eq!(validate_phone("222.333.4444").unwrap(), "2223334444");
    }

    #[test]
    fn test_invalid_phones_rejected() {
        for bad in ["", "123", "22233344445", "222333444a", "92223334444"] {
            assert!(
                matches!(validate_phone(bad), Err(SdkError::Validation(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails_rejected() {
        for bad in ["", "plain", "@x.com", "a@", "a@nodot", "a@.com", "a@x."] {
            assert!(
                matches!(validate_email(bad), Err(SdkError::Validation(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_email_md5_known_vector() {
        // md5("a@x.com")
        assert_eq!(email_md5("a@x.com"), "743173788aa9166801df2e18f0e7ff24");
    }

    #[test]
    fn test_email_md5_case_normalized() {
        assert_eq!(email_md5("A@X.COM"), email_md5("a@x.com"));
        assert_eq!(email_md5(" a@x.com "), email_md5("a@x.com"));
    }
}
