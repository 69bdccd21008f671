//! Read access to the backing data store.
//!
//! The traits are the seam between page composition and Postgres; the server
//! holds them as trait objects so tests can substitute in-memory stores.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::ZeroDownError;
use crate::models::{ChatLog, FailureTicket};
use crate::session::SessionId;

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Active tickets, newest first.
    async fn active_tickets(&self) -> Result<Vec<FailureTicket>, ZeroDownError>;
}

#[async_trait]
pub trait ChatLogStore: Send + Sync {
    /// All turns of `session`, oldest first.
    async fn history(&self, session: &SessionId) -> Result<Vec<ChatLog>, ZeroDownError>;
}

/// Postgres-backed implementation of both stores.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn active_tickets(&self) -> Result<Vec<FailureTicket>, ZeroDownError> {
        let rows = sqlx::query_as::<_, FailureTicket>(
            r#"
            SELECT id, sensor_id, severity_level, failure_status, confidence_score,
                   recommendation, is_active, created_at
            FROM failure_ticket
            WHERE is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "Fetched active failure tickets");
        Ok(rows)
    }
}

#[async_trait]
impl ChatLogStore for PgStore {
    async fn history(&self, session: &SessionId) -> Result<Vec<ChatLog>, ZeroDownError> {
        let rows = sqlx::query_as::<_, ChatLog>(
            r#"
            SELECT id, session_id, timestamp, user_query, bot_response
            FROM chat_logs
            WHERE session_id = $1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(session.as_str())
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(session = %session, count = rows.len(), "Fetched chat history");
        Ok(rows)
    }
}
