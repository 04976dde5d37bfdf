use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("version conflict updating record for {phone}: expected {expected}, found {found}")]
    VersionConflict {
        phone: String,
        expected: u64,
        found: u64,
    },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
