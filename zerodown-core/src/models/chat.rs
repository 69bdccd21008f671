use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `chat_logs` table: one user query and the bot's answer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatLog {
    pub id: i64,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub bot_response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::local(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::local(Role::Assistant, content)
    }

    /// A message created in this process rather than loaded from the store.
    fn local(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            role,
            content: content.into(),
            created_at: Some(Utc::now()),
        }
    }
}
