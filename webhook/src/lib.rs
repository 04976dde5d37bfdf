//! The webhook surface: transport handshake, payload authentication,
//! deduplication, and the processor that drives the engine.
//!
//! The transport contract is one-sided: the POST receiver always
//! acknowledges with success and swallows internal failures. Deliveries
//! can still repeat for transport reasons, so every envelope passes a
//! message-id dedup before dispatch.

pub mod auth;
pub mod config;
pub mod dedup;
pub mod error;
pub mod processor;
pub mod server;

pub use config::BotConfig;
pub use dedup::MessageDedup;
pub use error::WebhookError;
pub use processor::InboundProcessor;
pub use server::{AppState, WebhookServer};
