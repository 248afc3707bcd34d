//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, license numbers and dates of birth from
//! strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static QUERY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&]key=)[^&\s]+").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(AIza[0-9A-Za-z_\-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static LICENSE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Z]\d{4}-?\d{5}-?\d{5}|[A-Z]{1,2}\d{7,14})\b").unwrap()
});
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = QUERY_KEY_RE
        .replace_all(input, "${1}[REDACTED_TOKEN]")
        .to_string();

    redacted = API_KEY_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .to_string();

    redacted = LICENSE_NUMBER_RE
        .replace_all(&redacted, "[REDACTED_LICENSE]")
        .to_string();

    // Dates of birth and expiry dates
    redacted = ISO_DATE_RE
        .replace_all(&redacted, "[REDACTED_DATE]")
        .to_string();

    redacted
}
