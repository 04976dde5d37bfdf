use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to bind webhook listener: {0}")]
    Bind(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("configuration error: {0}")]
    Config(String),
}
