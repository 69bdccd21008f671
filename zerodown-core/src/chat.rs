//! Chat transport — forwards one user message to the remote chat service.
//!
//! The remote service owns persistence of the turn (it writes `chat_logs`).
//! This client issues exactly one request per call: no retries, no
//! deduplication, no cancellation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ChatConfig;
use crate::session::SessionId;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `message` for `session` and return the assistant's reply text.
    async fn send(&self, message: &str, session: &SessionId) -> Result<String, ChatError>;
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Chat endpoint is not configured")]
    MissingEndpoint,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat server error ({code}): {message}")]
    Status { code: u16, message: String },

    #[error("Chat request rejected (status {status}): {message}")]
    Rejected { status: String, message: String },

    #[error("Invalid chat response: {0}")]
    InvalidResponse(String),
}

impl ChatError {
    /// Short text suitable for an assistant-authored error bubble.
    pub fn user_detail(&self) -> String {
        match self {
            ChatError::MissingEndpoint => "the chat endpoint is not configured".to_string(),
            ChatError::Http(_) => "could not connect to the chat server".to_string(),
            ChatError::Status { message, .. } | ChatError::Rejected { message, .. } => {
                message.clone()
            }
            ChatError::InvalidResponse(_) => "unexpected response from the chat server".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

/// reqwest-based client for `POST {api_url}/chat`.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    base_url: Option<String>,
}

impl HttpChatClient {
    /// Build from config. A missing `api_url` is not an error here; it
    /// surfaces as `ChatError::MissingEndpoint` on each send.
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let base_url = config
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string());

        if base_url.is_none() {
            tracing::warn!("chat.api_url is not set; chat messages will fail");
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Create a client with an explicit base URL (for testing / integration)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ChatError> {
        Self::new(&ChatConfig {
            api_url: Some(base_url.into()),
            timeout_secs: None,
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn send(&self, message: &str, session: &SessionId) -> Result<String, ChatError> {
        let base_url = self.base_url.as_deref().ok_or(ChatError::MissingEndpoint)?;
        let url = format!("{}/chat", base_url);

        let request = ChatRequest {
            message,
            session_id: session.as_str(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| error_detail(&v))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Server Error")
                        .to_string()
                });

            return Err(ChatError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let reply: Value = serde_json::from_str(&body)
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        match reply.get("status").and_then(Value::as_str) {
            Some("success") => reply
                .get("response")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ChatError::InvalidResponse("missing `response` field".to_string())),
            other => {
                let status = other.unwrap_or("missing").to_string();
                let message = error_detail(&reply)
                    .unwrap_or_else(|| "the chat service did not report success".to_string());
                Err(ChatError::Rejected { status, message })
            }
        }
    }
}

/// First of `error`, `message`, `detail` present in an error body.
fn error_detail(body: &Value) -> Option<String> {
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| match v {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

// ============================================================================
// TESTS
// ============================================================================
