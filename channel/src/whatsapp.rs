//! WhatsApp Cloud API adapter.
//!
//! Delivers [`Outbound`] messages through the Graph API `messages`
//! endpoint. Request bodies are built separately from the HTTP call so
//! the mapping can be tested without a network.

use serde_json::{json, Value};
use tracing::debug;

use crate::outbound::{MessageChannel, Outbound};
use crate::ChannelError;

/// Default Graph API base.
const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Channel implementation speaking the WhatsApp Cloud API.
pub struct WhatsAppChannel {
    base_url: String,
    phone_number_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    pub fn new(phone_number_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: GRAPH_API_BASE.to_string(),
            phone_number_id: phone_number_id.into(),
            access_token: access_token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the adapter at a custom API base (test servers, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.phone_number_id)
    }

    /// The Cloud API request body for an outbound message.
    pub fn request_body(message: &Outbound) -> Value {
        match message {
            Outbound::Text { to, body } => json!({
                "messaging_product": "whatsapp",
                "to": to.as_str(),
                "type": "text",
                "text": { "body": body },
            }),
            Outbound::List {
                to,
                header,
                body,
                button,
                sections,
            } => json!({
                "messaging_product": "whatsapp",
                "to": to.as_str(),
                "type": "interactive",
                "interactive": {
                    "type": "list",
                    "header": { "type": "text", "text": header },
                    "body": { "text": body },
                    "action": {
                        "button": button,
                        "sections": sections.iter().map(|s| json!({
                            "title": s.title,
                            "rows": s.rows.iter().map(|r| json!({
                                "id": r.id,
                                "title": r.title,
                                "description": r.description,
                            })).collect::<Vec<_>>(),
                        })).collect::<Vec<_>>(),
                    },
                },
            }),
            Outbound::Buttons { to, body, buttons } => json!({
                "messaging_product": "whatsapp",
                "to": to.as_str(),
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": { "text": body },
                    "action": {
                        "buttons": buttons.iter().map(|b| json!({
                            "type": "reply",
                            "reply": { "id": b.id, "title": b.title },
                        })).collect::<Vec<_>>(),
                    },
                },
            }),
        }
    }
}

impl MessageChannel for WhatsAppChannel {
    async fn send(&self, message: &Outbound) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .json(&Self::request_body(message))
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %message.recipient(), "message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::{Button, ListRow, ListSection};
    use barlink_types::PhoneNumber;

    fn to() -> PhoneNumber {
        PhoneNumber::normalize("16041234567")
    }

    #[test]
    fn text_body_shape() {
        let body = WhatsAppChannel::request_body(&Outbound::Text {
            to: to(),
            body: "hello".into(),
        });
        assert_eq!(body["type"], "text");
        assert_eq!(body["to"], "16041234567");
        assert_eq!(body["text"]["body"], "hello");
    }

    #[test]
    fn list_body_shape() {
        let body = WhatsAppChannel::request_body(&Outbound::List {
            to: to(),
            header: "BarLink".into(),
            body: "Pick one".into(),
            button: "Menu".into(),
            sections: vec![ListSection {
                title: "Lawyers".into(),
                rows: vec![ListRow {
                    id: "lawyer_signup".into(),
                    title: "Lawyer sign-up".into(),
                    description: "Register as a lawyer".into(),
                }],
            }],
        });
        assert_eq!(body["interactive"]["type"], "list");
        assert_eq!(body["interactive"]["action"]["button"], "Menu");
        assert_eq!(
            body["interactive"]["action"]["sections"][0]["rows"][0]["id"],
            "lawyer_signup"
        );
    }

    #[test]
    fn buttons_body_shape() {
        let body = WhatsAppChannel::request_body(&Outbound::Buttons {
            to: to(),
            body: "Confirm?".into(),
            buttons: vec![
                Button {
                    id: "confirm_yes".into(),
                    title: "Yes".into(),
                },
                Button {
                    id: "confirm_no".into(),
                    title: "No".into(),
                },
            ],
        });
        assert_eq!(body["interactive"]["type"], "button");
        let buttons = body["interactive"]["action"]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0]["reply"]["id"], "confirm_yes");
    }

    #[test]
    fn custom_base_url_is_trimmed() {
        let channel =
            WhatsAppChannel::new("12345", "token").with_base_url("http://localhost:9009/");
        assert_eq!(channel.endpoint(), "http://localhost:9009/12345/messages");
    }
}
