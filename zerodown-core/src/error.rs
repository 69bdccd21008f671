use thiserror::Error;

use crate::chat::ChatError;

#[derive(Error, Debug)]
pub enum ZeroDownError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Other error: {0}")]
    Other(String),
}
