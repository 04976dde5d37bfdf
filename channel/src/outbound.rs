//! Outbound message shapes and the channel trait.

use std::future::Future;

use barlink_types::PhoneNumber;
use serde::{Deserialize, Serialize};

use crate::ChannelError;

/// A row in a single-choice list message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// A titled group of list rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// A reply button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

/// An outbound message, as data. The engine emits these; a
/// [`MessageChannel`] delivers them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    Text {
        to: PhoneNumber,
        body: String,
    },
    List {
        to: PhoneNumber,
        header: String,
        body: String,
        button: String,
        sections: Vec<ListSection>,
    },
    Buttons {
        to: PhoneNumber,
        body: String,
        buttons: Vec<Button>,
    },
}

impl Outbound {
    pub fn recipient(&self) -> &PhoneNumber {
        match self {
            Outbound::Text { to, .. } => to,
            Outbound::List { to, .. } => to,
            Outbound::Buttons { to, .. } => to,
        }
    }
}

/// Send-only delivery abstraction.
pub trait MessageChannel: Send + Sync {
    fn send(
        &self,
        message: &Outbound,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;
}
