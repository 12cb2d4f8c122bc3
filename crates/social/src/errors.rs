use thiserror::Error;

use crate::memory::StoreOp;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Record must serialize to a JSON object")]
    NotAnObject,

    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("Timestamp formatting error: {0}")]
    Clock(#[from] time::error::Format),

    #[error("Remote store error: {0}")]
    Remote(BoxError),

    #[error("Injected {op:?} failure on {collection}")]
    Injected { op: StoreOp, collection: String },
}

impl StoreError {
    /// Wraps an error raised by a remote store client.
    pub fn remote(err: impl Into<BoxError>) -> Self {
        StoreError::Remote(err.into())
    }
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Login already exists: {0}")]
    DuplicateLogin(String),

    #[error("Provider rejected principal: {0}")]
    Rejected(String),

    #[error("Failed to hash secret: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Remote identity error: {0}")]
    Remote(BoxError),
}

impl IdentityError {
    /// Wraps an error raised by a remote identity client.
    pub fn remote(err: impl Into<BoxError>) -> Self {
        IdentityError::Remote(err.into())
    }
}
