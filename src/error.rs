use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// The remote API rejected the credential (HTTP 401).
    #[error("Authorisation failed: {0}")]
    Auth(String),
    /// Any other non-200 answer from the remote API.
    #[error("API error ({status}): {body}")]
    Remote { status: u16, body: String },
    #[error("{0}")]
    Validation(String),
    #[error("You are not registered. Please contact an administrator.")]
    NotRegistered,
    #[error("You do not have administrator rights.")]
    PermissionDenied,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl BotError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::InternalError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
