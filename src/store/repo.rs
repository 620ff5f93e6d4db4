use thiserror::Error;

use crate::domain::email::{Email, EmailId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid email store url {0}")]
    InvalidUrl(String),
    #[error("cannot reach email store: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("email store answered {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },
    #[error("cannot decode email list: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The upstream service holding the classified emails and their drafts.
pub trait EmailStore: Send {
    fn list_emails(&self) -> Result<Vec<Email>, StoreError>;
    fn save_response(&self, id: &EmailId, ai_response: &str) -> Result<(), StoreError>;
}
