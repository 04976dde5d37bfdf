//! The message channel: how the engine talks to users and how inbound
//! transport payloads become envelopes.
//!
//! Outbound messages are plain data ([`Outbound`]) so the engine stays
//! pure; actually delivering them is the job of a [`MessageChannel`]
//! implementation. The production implementation speaks the WhatsApp
//! Cloud API; tests use a recording null channel.

pub mod envelope;
pub mod error;
pub mod outbound;
pub mod whatsapp;

pub use envelope::{Envelope, Payload};
pub use error::ChannelError;
pub use outbound::{Button, ListRow, ListSection, MessageChannel, Outbound};
pub use whatsapp::WhatsAppChannel;
