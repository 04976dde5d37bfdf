//! Access PIN type.
//!
//! The PIN is the credential the login surface later exchanges for a
//! session token. It is short enough to read over the phone, so the
//! alphabet excludes visually confusable characters (I, L, O, 0, 1).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Characters a PIN may contain. Uppercase alphanumerics minus the
/// confusable I, L, O, 0, 1.
pub const PIN_ALPHABET: &str = "ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// PIN length issued by the engine.
pub const PIN_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinError {
    #[error("PIN must be exactly {expected} characters, got {got}")]
    Length { expected: usize, got: usize },

    #[error("PIN contains character '{0}' outside the allowed alphabet")]
    Alphabet(char),
}

/// A 6-character access PIN from the unambiguous alphabet.
///
/// Construction normalizes to uppercase, matching what the login surface
/// does with user input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPin(String);

impl AccessPin {
    /// Parse a raw PIN string, normalizing case and validating the alphabet.
    pub fn parse(raw: &str) -> Result<Self, PinError> {
        let normalized: String = raw.trim().to_uppercase();
        if normalized.len() != PIN_LENGTH {
            return Err(PinError::Length {
                expected: PIN_LENGTH,
                got: normalized.len(),
            });
        }
        if let Some(bad) = normalized.chars().find(|c| !PIN_ALPHABET.contains(*c)) {
            return Err(PinError::Alphabet(bad));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
