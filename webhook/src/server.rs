//! Axum webhook server.
//!
//! Two routes: the GET verification handshake Meta performs when the
//! webhook is registered, and the POST receiver. The receiver always
//! returns success to the transport — processing failures are logged and
//! swallowed at this boundary, never surfaced as HTTP errors.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use barlink_channel::{envelope::WebhookPayload, MessageChannel};
use barlink_store::IdentityStore;
use tracing::{debug, info, warn};

use crate::{auth, InboundProcessor, WebhookError};

/// Shared state for the webhook routes.
pub struct AppState<S: IdentityStore, C: MessageChannel> {
    pub processor: InboundProcessor<S, C>,
    pub verify_token: String,
    pub app_secret: Option<String>,
}

/// Build the webhook router.
pub fn router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
    S: IdentityStore + 'static,
    C: MessageChannel + 'static,
{
    Router::new()
        .route(
            "/webhook",
            get(verify_handler::<S, C>).post(receive_handler::<S, C>),
        )
        .with_state(state)
}

/// The webhook server, configured with a port and shared state.
pub struct WebhookServer<S: IdentityStore, C: MessageChannel> {
    pub port: u16,
    pub state: Arc<AppState<S, C>>,
}

impl<S, C> WebhookServer<S, C>
where
    S: IdentityStore + 'static,
    C: MessageChannel + 'static,
{
    pub fn new(port: u16, state: Arc<AppState<S, C>>) -> Self {
        Self { port, state }
    }

    /// Start listening. Runs until the server is shut down.
    pub async fn start(&self) -> Result<(), WebhookError> {
        let app = router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        info!("webhook listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| WebhookError::Bind(e.to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| WebhookError::Server(e.to_string()))?;
        Ok(())
    }
}

/// GET handshake: echo the challenge when the mode and token match.
async fn verify_handler<S: IdentityStore, C: MessageChannel>(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState<S, C>>>,
) -> Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

    if mode == Some("subscribe") && token == Some(state.verify_token.as_str()) {
        debug!("webhook verification handshake accepted");
        (StatusCode::OK, challenge).into_response()
    } else {
        warn!("webhook verification handshake rejected");
        StatusCode::FORBIDDEN.into_response()
    }
}

/// POST receiver: authenticate, decode, process — and acknowledge with
/// 200 no matter what happened inside.
async fn receive_handler<S: IdentityStore, C: MessageChannel>(
    State(state): State<Arc<AppState<S, C>>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.app_secret {
        let header = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok());
        if !auth::signature_is_valid(secret, header, &body) {
            warn!("dropping delivery with bad or missing signature");
            return StatusCode::OK;
        }
    }

    match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => {
            for envelope in payload.envelopes() {
                state.processor.process(&envelope).await;
            }
        }
        Err(e) => {
            warn!(error = %e, "undecodable webhook delivery dropped");
        }
    }

    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use barlink_engine::RegistrationEngine;
    use barlink_nullables::{MemoryIdentityStore, NullChannel};
    use barlink_types::{EngineParams, PhoneNumber};

    fn state(
        app_secret: Option<&str>,
    ) -> Arc<AppState<MemoryIdentityStore, NullChannel>> {
        let engine =
            RegistrationEngine::new(MemoryIdentityStore::new(), &EngineParams::default());
        Arc::new(AppState {
            processor: InboundProcessor::new(engine, NullChannel::new(), 64),
            verify_token: "hunter2".into(),
            app_secret: app_secret.map(String::from),
        })
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn handshake_echoes_challenge_on_token_match() {
        let response = verify_handler(
            query(&[
                ("hub.mode", "subscribe"),
                ("hub.verify_token", "hunter2"),
                ("hub.challenge", "12345"),
            ]),
            State(state(None)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn handshake_rejects_wrong_token() {
        let response = verify_handler(
            query(&[
                ("hub.mode", "subscribe"),
                ("hub.verify_token", "wrong"),
                ("hub.challenge", "12345"),
            ]),
            State(state(None)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn handshake_rejects_wrong_mode() {
        let response = verify_handler(
            query(&[("hub.mode", "unsubscribe"), ("hub.verify_token", "hunter2")]),
            State(state(None)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn receiver_processes_messages_and_acks() {
        let state = state(None);
        let body = Bytes::from_static(
            br#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"16045550001","id":"wamid.X","type":"text","text":{"body":"hi"}}
            ]}}]}]}"#,
        );

        let status = receive_handler(State(state.clone()), HeaderMap::new(), body).await;
        assert_eq!(status, StatusCode::OK);

        let stored = state
            .processor
            .engine()
            .store()
            .get(&PhoneNumber::normalize("16045550001"))
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn receiver_acks_garbage_without_processing() {
        let status = receive_handler(
            State(state(None)),
            HeaderMap::new(),
            Bytes::from_static(b"not json"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn receiver_drops_unsigned_delivery_when_secret_set() {
        let state = state(Some("secret"));
        let body = Bytes::from_static(
            br#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"16045550001","id":"wamid.X","type":"text","text":{"body":"hi"}}
            ]}}]}]}"#,
        );

        let status = receive_handler(State(state.clone()), HeaderMap::new(), body).await;
        // Still acknowledged, but nothing was processed.
        assert_eq!(status, StatusCode::OK);
        assert!(state
            .processor
            .engine()
            .store()
            .get(&PhoneNumber::normalize("16045550001"))
            .unwrap()
            .is_none());
    }
}
