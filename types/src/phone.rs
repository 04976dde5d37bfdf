//! Normalized phone numbers.
//!
//! Inbound messages carry phone numbers in whatever shape the sender's
//! country and the transport produced ("+1 604-123-4567", "16041234567",
//! "604 123 4567"). Matching is tolerant: two numbers are considered the
//! same identity when their trailing ten digits agree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A phone number normalized to its digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize a raw phone string by stripping everything but digits.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.chars().filter(|c| c.is_ascii_digit()).collect())
    }

    /// The normalized digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digit_count(&self) -> usize {
        self.0.len()
    }

    /// The trailing ten digits (or the whole number if shorter).
    pub fn suffix(&self) -> &str {
        let start = self.0.len().saturating_sub(10);
        &self.0[start..]
    }

    /// Suffix-tolerant equality: same trailing ten digits.
    pub fn matches(&self, other: &PhoneNumber) -> bool {
        !self.0.is_empty() && self.suffix() == other.suffix()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PhoneNumber {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}
