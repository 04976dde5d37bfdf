//! The inbound processor: dedup → dispatch → send.

use std::sync::Mutex;

use barlink_channel::{Envelope, MessageChannel};
use barlink_engine::{prompts, RegistrationEngine};
use barlink_store::IdentityStore;
use chrono::Utc;
use tracing::{debug, error, warn};

use crate::dedup::MessageDedup;

/// Ties the engine to a delivery channel and applies the boundary error
/// policy: store failures leave the conversation step unadvanced and the
/// user gets a retry-later text; send failures are logged and never roll
/// back a persisted mutation.
pub struct InboundProcessor<S: IdentityStore, C: MessageChannel> {
    engine: RegistrationEngine<S>,
    channel: C,
    dedup: Mutex<MessageDedup>,
}

impl<S: IdentityStore, C: MessageChannel> InboundProcessor<S, C> {
    pub fn new(engine: RegistrationEngine<S>, channel: C, dedup_capacity: usize) -> Self {
        Self {
            engine,
            channel,
            dedup: Mutex::new(MessageDedup::new(dedup_capacity)),
        }
    }

    pub fn engine(&self) -> &RegistrationEngine<S> {
        &self.engine
    }

    /// Handle one envelope end to end. Never fails — the webhook boundary
    /// swallows outcomes either way.
    pub async fn process(&self, envelope: &Envelope) {
        let duplicate = self
            .dedup
            .lock()
            .expect("dedup mutex poisoned")
            .is_duplicate(&envelope.message_id);
        if duplicate {
            debug!(message_id = %envelope.message_id, "duplicate delivery skipped");
            return;
        }

        match self.engine.dispatch(envelope, Utc::now()) {
            Ok(outcome) => {
                for message in &outcome.outbound {
                    // Notification delivery is best-effort.
                    if let Err(e) = self.channel.send(message).await {
                        warn!(to = %message.recipient(), error = %e, "outbound send failed");
                    }
                }
            }
            Err(e) => {
                error!(from = %envelope.from, error = %e, "dispatch failed, step not advanced");
                let _ = self
                    .channel
                    .send(&prompts::try_again_later(&envelope.from))
                    .await;
            }
        }
    }
}
