//! Secret detection and redaction utilities.
//!
//! Dataset options are free-form, so callers may smuggle credentials into
//! them (`accessKey`, `token`, ...). These helpers keep such values out of
//! error metadata and human-readable output.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key/variable name likely refers to a secret.
///
/// Uses case-insensitive pattern matching to detect common secret-related
/// naming conventions.
///
/// # Examples
///
/// ```
/// use dataset_shared::is_secret_key;
///
/// assert!(is_secret_key("accessKey"));
/// assert!(is_secret_key("PASSWORD"));
/// assert!(!is_secret_key("storage"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Redacts a value if the key is likely a secret.
///
/// # Examples
///
/// ```
/// use dataset_shared::redact_if_secret;
///
/// assert_eq!(redact_if_secret("secretKey", "abc"), "[REDACTED]");
/// assert_eq!(redact_if_secret("ssl", "true"), "true");
/// ```
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_owned()
    } else {
        value.to_owned()
    }
}
