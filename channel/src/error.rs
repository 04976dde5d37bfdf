use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("API rejected message: HTTP {status}: {body}")]
    Api { status: u16, body: String },
}
