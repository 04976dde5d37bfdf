use barlink_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no verified lawyer record matches referrer phone {0}")]
    ReferrerNotFound(String),

    #[error("no articling student record matches phone {0}")]
    StudentNotFound(String),

    #[error("no articling student record matches the supplied name and email")]
    AccountNotFound,

    #[error("{0} is not authorized to verify articling students")]
    Unauthorized(String),

    #[error("could not issue a unique PIN after {0} attempts")]
    PinSpaceExhausted(u32),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
