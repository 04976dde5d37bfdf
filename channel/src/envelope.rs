//! Inbound envelopes and WhatsApp Cloud API webhook payload decoding.
//!
//! A webhook delivery can carry several messages (and can also be a
//! status-only notification with none at all). Decoding flattens the
//! nested entry/changes/value structure into a list of [`Envelope`]s the
//! processor can dispatch one at a time.

use barlink_types::PhoneNumber;
use serde::Deserialize;

/// What the user actually sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Free-form text.
    Text(String),
    /// The id of a selected list row or tapped button.
    Selection(String),
}

/// One inbound message, normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub from: PhoneNumber,
    /// Transport message id, used for at-least-once deduplication.
    pub message_id: String,
    pub payload: Payload,
}

// ── Cloud API webhook payload (the parts we read) ──────────────────────

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextContent>,
    pub interactive: Option<InteractiveContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct InteractiveContent {
    pub list_reply: Option<Reply>,
    pub button_reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    pub id: String,
}

impl WebhookPayload {
    /// Flatten the webhook structure into dispatchable envelopes.
    /// Messages of kinds we do not handle (media, reactions, statuses)
    /// are skipped.
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.entry
            .iter()
            .flat_map(|e| &e.changes)
            .flat_map(|c| &c.value.messages)
            .filter_map(|m| {
                let payload = match m.kind.as_str() {
                    "text" => Payload::Text(m.text.as_ref()?.body.clone()),
                    "interactive" => {
                        let interactive = m.interactive.as_ref()?;
                        let reply = interactive
                            .list_reply
                            .as_ref()
                            .or(interactive.button_reply.as_ref())?;
                        Payload::Selection(reply.id.clone())
                    }
                    _ => return None,
                };
                Some(Envelope {
                    from: PhoneNumber::normalize(&m.from),
                    message_id: m.id.clone(),
                    payload,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<Envelope> {
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        payload.envelopes()
    }

    #[test]
    fn text_message_decodes() {
        let envelopes = decode(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"16041234567","id":"wamid.A1","type":"text",
                 "text":{"body":"hello"}}
            ]}}]}]}"#,
        );
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].from.as_str(), "16041234567");
        assert_eq!(envelopes[0].message_id, "wamid.A1");
        assert_eq!(envelopes[0].payload, Payload::Text("hello".into()));
    }

    #[test]
    fn list_reply_decodes_to_selection() {
        let envelopes = decode(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"16041234567","id":"wamid.B2","type":"interactive",
                 "interactive":{"list_reply":{"id":"lawyer_signup","title":"Lawyer sign-up"}}}
            ]}}]}]}"#,
        );
        assert_eq!(
            envelopes[0].payload,
            Payload::Selection("lawyer_signup".into())
        );
    }

    #[test]
    fn button_reply_decodes_to_selection() {
        let envelopes = decode(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"16041234567","id":"wamid.C3","type":"interactive",
                 "interactive":{"button_reply":{"id":"confirm_yes","title":"Yes"}}}
            ]}}]}]}"#,
        );
        assert_eq!(
            envelopes[0].payload,
            Payload::Selection("confirm_yes".into())
        );
    }

    #[test]
    fn status_only_payload_produces_no_envelopes() {
        let envelopes = decode(r#"{"entry":[{"changes":[{"value":{"statuses":[{"id":"x"}]}}]}]}"#);
        assert!(envelopes.is_empty());
    }

    #[test]
    fn unsupported_kinds_are_skipped() {
        let envelopes = decode(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"16041234567","id":"wamid.D4","type":"image"},
                {"from":"16041234567","id":"wamid.D5","type":"text","text":{"body":"ok"}}
            ]}}]}]}"#,
        );
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].message_id, "wamid.D5");
    }

    #[test]
    fn multiple_entries_flatten_in_order() {
        let envelopes = decode(
            r#"{"entry":[
                {"changes":[{"value":{"messages":[
                    {"from":"16041111111","id":"wamid.E1","type":"text","text":{"body":"a"}}]}}]},
                {"changes":[{"value":{"messages":[
                    {"from":"16042222222","id":"wamid.E2","type":"text","text":{"body":"b"}}]}}]}
            ]}"#,
        );
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].message_id, "wamid.E1");
        assert_eq!(envelopes[1].message_id, "wamid.E2");
    }
}
