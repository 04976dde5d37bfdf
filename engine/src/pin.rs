//! Access-PIN issuance.

use barlink_store::{IdentityStore, StoreError};
use barlink_types::{AccessPin, EngineParams, PIN_ALPHABET, pin::PIN_LENGTH};
use rand::Rng;

use crate::EngineError;

/// Generates unbiased PINs from the unambiguous alphabet and guarantees
/// uniqueness against the store at issuance time. Collisions are
/// regenerated, bounded by `max_attempts`.
pub struct PinIssuer {
    max_attempts: u32,
}

impl PinIssuer {
    pub fn new(params: &EngineParams) -> Self {
        Self {
            max_attempts: params.max_pin_attempts,
        }
    }

    /// Issue a PIN not currently held by any record in the store.
    pub fn issue<S: IdentityStore>(&self, store: &S) -> Result<AccessPin, EngineError> {
        self.issue_with(|pin| store.pin_in_use(pin))
    }

    /// Issue against an arbitrary in-use predicate. Seam for tests and
    /// for stores with cheaper uniqueness indexes.
    pub fn issue_with(
        &self,
        mut in_use: impl FnMut(&AccessPin) -> Result<bool, StoreError>,
    ) -> Result<AccessPin, EngineError> {
        let mut rng = rand::thread_rng();
        for _ in 0..self.max_attempts {
            let pin = generate(&mut rng);
            if !in_use(&pin)? {
                return Ok(pin);
            }
        }
        Err(EngineError::PinSpaceExhausted(self.max_attempts))
    }
}

/// One uniform draw per character. `gen_range` is unbiased over the
/// alphabet, so no character is favored.
fn generate(rng: &mut impl Rng) -> AccessPin {
    let alphabet: Vec<char> = PIN_ALPHABET.chars().collect();
    let raw: String = (0..PIN_LENGTH)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect();
    AccessPin::parse(&raw).expect("generated PIN is always well-formed")
}
