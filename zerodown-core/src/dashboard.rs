//! Page composition: everything the dashboard shows for one session.

use crate::mapping;
use crate::models::TicketView;
use crate::session::SessionId;
use crate::store::{ChatLogStore, TicketStore};
use crate::transcript::Transcript;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub session: SessionId,
    pub alerts: Vec<TicketView>,
    pub transcript: Transcript,
}

impl Dashboard {
    /// Fetch tickets and chat history concurrently. Store failures are
    /// logged and render as empty sections.
    pub async fn load(
        tickets: &dyn TicketStore,
        logs: &dyn ChatLogStore,
        session: SessionId,
        fallback_action: &str,
    ) -> Self {
        let (alerts, transcript) = tokio::join!(
            fetch_alerts(tickets, fallback_action),
            fetch_transcript(logs, &session),
        );

        Self {
            session,
            alerts,
            transcript,
        }
    }
}

pub async fn fetch_alerts(store: &dyn TicketStore, fallback_action: &str) -> Vec<TicketView> {
    let rows = match store.active_tickets().await {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch failure tickets");
            None
        }
    };
    mapping::map_tickets(rows, fallback_action)
}

pub async fn fetch_transcript(store: &dyn ChatLogStore, session: &SessionId) -> Transcript {
    match store.history(session).await {
        Ok(logs) => Transcript::from_history(&logs),
        Err(e) => {
            tracing::warn!(session = %session, error = %e, "Failed to fetch chat history");
            Transcript::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZeroDownError;
    use crate::models::{ChatLog, FailureTicket, Variant};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct Tickets(Result<Vec<FailureTicket>, ()>, Option<Arc<Barrier>>);
    struct Logs(Vec<ChatLog>, Option<Arc<Barrier>>);

    #[async_trait]
    impl TicketStore for Tickets {
        async fn active_tickets(&self) -> Result<Vec<FailureTicket>, ZeroDownError> {
            if let Some(b) = &self.1 {
                b.wait().await;
            }
            self.0
                .clone()
                .map_err(|_| ZeroDownError::Other("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl ChatLogStore for Logs {
        async fn history(&self, session: &SessionId) -> Result<Vec<ChatLog>, ZeroDownError> {
            if let Some(b) = &self.1 {
                b.wait().await;
            }
            Ok(self
                .0
                .iter()
                .filter(|l| l.session_id == session.as_str())
                .cloned()
                .collect())
        }
    }

    fn ticket(id: i64, severity: &str) -> FailureTicket {
        FailureTicket {
            id,
            sensor_id: id,
            severity_level: Some(severity.to_string()),
            failure_status: Some("Pressure drop".to_string()),
            confidence_score: Some(0.75),
            recommendation: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn log(id: i64, session: &str) -> ChatLog {
        ChatLog {
            id,
            session_id: session.to_string(),
            timestamp: Utc::now(),
            user_query: format!("q{}", id),
            bot_response: format!("a{}", id),
        }
    }

    fn session() -> SessionId {
        SessionId::parse("sess_dashboard1").unwrap()
    }

    #[tokio::test]
    async fn test_load_maps_tickets_and_expands_history() {
        let tickets = Tickets(Ok(vec![ticket(1, "FATAL"), ticket(2, "low")]), None);
        let logs = Logs(vec![log(1, "sess_dashboard1"), log(2, "sess_other")], None);

        let dashboard = Dashboard::load(&tickets, &logs, session(), "Inspect").await;

        assert_eq!(dashboard.alerts.len(), 2);
        assert_eq!(dashboard.alerts[0].variant, Variant::Fatal);
        assert_eq!(dashboard.alerts[0].action, "Inspect");
        assert_eq!(dashboard.alerts[0].description, "Pressure drop (75.0%)");
        assert_eq!(dashboard.transcript.len(), 2);
        assert!(!dashboard.transcript.is_loading());
        assert_eq!(dashboard.session, session());
    }

    #[tokio::test]
    async fn test_ticket_failure_renders_empty_alert_list() {
        let tickets = Tickets(Err(()), None);
        let logs = Logs(vec![log(1, "sess_dashboard1")], None);

        let dashboard = Dashboard::load(&tickets, &logs, session(), "Inspect").await;

        assert!(dashboard.alerts.is_empty());
        assert_eq!(dashboard.transcript.len(), 2, "history unaffected by ticket failure");
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        // Each store waits for the other; sequential fetching would deadlock.
        let barrier = Arc::new(Barrier::new(2));
        let tickets = Tickets(Ok(vec![ticket(1, "critical")]), Some(barrier.clone()));
        let logs = Logs(vec![], Some(barrier));

        let loaded = tokio::time::timeout(
            Duration::from_secs(2),
            Dashboard::load(&tickets, &logs, session(), "Inspect"),
        )
        .await;

        assert!(loaded.is_ok(), "ticket and history fetches must overlap");
    }
}
