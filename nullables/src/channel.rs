//! Recording channel — captures every outbound message.

use std::sync::Mutex;

use barlink_channel::{ChannelError, MessageChannel, Outbound};

/// A channel that delivers nothing and remembers everything.
pub struct NullChannel {
    sent: Mutex<Vec<Outbound>>,
    /// When set, every send fails — for exercising best-effort paths.
    fail_sends: bool,
}

impl NullChannel {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: true,
        }
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Default for NullChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageChannel for NullChannel {
    async fn send(&self, message: &Outbound) -> Result<(), ChannelError> {
        if self.fail_sends {
            return Err(ChannelError::Transport("null channel failure".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
