//! The BarLink registration engine.
//!
//! One long-lived, resumable conversation per phone number, dispatched
//! step by step:
//!
//! 1. **Lawyer sign-up** — self-attested, verified immediately, no expiry.
//! 2. **Articling student sign-up** — dormant until the named referrer
//!    (a verified lawyer) confirms; access capped at nine months.
//! 3. **Student verification** — the referrer's side of the trust chain.
//! 4. **Upgrade to lawyer** — converts a student record in place,
//!    preserving the original PIN and migrating the phone identity.
//!
//! The dispatcher is pure apart from its two side channels: the injected
//! store (persistence) and the outbound prompts it returns for the caller
//! to send. Time is injected per dispatch.

pub mod error;
pub mod expiry;
pub mod machine;
pub mod pin;
pub mod prompts;
pub mod upgrade;
pub mod validate;
pub mod verify;

pub use error::EngineError;
pub use expiry::ExpiryPolicy;
pub use machine::{DispatchOutcome, RegistrationEngine};
pub use pin::PinIssuer;
pub use upgrade::{UpgradeOutcome, UpgradeResolver};
pub use verify::VerificationChain;
