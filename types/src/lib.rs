//! Fundamental types for the BarLink registration engine.
//!
//! Everything here is plain data: phone numbers, access PINs, the identity
//! record, and the conversation-step machinery the engine dispatches on.
//! No I/O, no clocks — callers inject time where it matters.

pub mod flow;
pub mod params;
pub mod phone;
pub mod pin;
pub mod record;
pub mod step;

pub use flow::FlowScratch;
pub use params::EngineParams;
pub use phone::PhoneNumber;
pub use pin::{AccessPin, PinError, PIN_ALPHABET};
pub use record::{AccessStatus, IdentityRecord, UserType};
pub use step::RegistrationStep;
