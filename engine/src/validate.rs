//! Inbound answer validation.
//!
//! A `None` from any of these means the step re-prompts without advancing
//! or mutating the record — validation failure is recovered in place,
//! never surfaced as a hard error.

use barlink_types::PhoneNumber;
use chrono::NaiveDate;

/// A non-empty free-text answer (names, firm names), trimmed.
pub fn name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Minimal email shape check: something with an '@' and a '.'.
pub fn email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (trimmed.contains('@') && trimmed.contains('.') && !trimmed.contains(char::is_whitespace))
        .then(|| trimmed.to_string())
}

/// A phone with at least ten digits, normalized.
pub fn phone(raw: &str) -> Option<PhoneNumber> {
    let normalized = PhoneNumber::normalize(raw);
    (normalized.digit_count() >= 10).then_some(normalized)
}

/// A `YYYY-MM-DD` calendar date.
pub fn date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// A `YYYY-MM-DD` date strictly after `today`.
pub fn future_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    date(raw).filter(|d| *d > today)
}
