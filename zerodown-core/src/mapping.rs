//! Row → view-model projections for the alert list and the chat transcript.

use crate::models::{ChatLog, ChatMessage, FailureTicket, Role, TicketView, Variant};

const UNKNOWN_FAILURE: &str = "Unknown failure";

/// Format a 0..1 confidence score as a percentage with one decimal place.
pub fn format_confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn ticket_to_view(ticket: &FailureTicket, fallback_action: &str) -> TicketView {
    let failure = ticket
        .failure_status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(UNKNOWN_FAILURE);

    let description = match ticket.confidence_score {
        Some(score) => format!("{} ({})", failure, format_confidence(score)),
        None => failure.to_string(),
    };

    let action = ticket
        .recommendation
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback_action)
        .to_string();

    TicketView {
        id: ticket.id,
        equipment_name: format!("Machine Sensor #{}", ticket.sensor_id),
        variant: Variant::from_severity(ticket.severity_level.as_deref()),
        description,
        action,
        status: if ticket.is_active { "Pending" } else { "Resolved" }.to_string(),
    }
}

/// Map fetched rows to view models, keeping store order. `None` (a failed
/// fetch) maps to an empty list.
pub fn map_tickets(rows: Option<Vec<FailureTicket>>, fallback_action: &str) -> Vec<TicketView> {
    rows.unwrap_or_default()
        .iter()
        .map(|t| ticket_to_view(t, fallback_action))
        .collect()
}

/// Expand one persisted turn into its user and assistant messages.
pub fn expand_chat_log(log: &ChatLog) -> [ChatMessage; 2] {
    [
        ChatMessage {
            id: format!("u-{}", log.id),
            role: Role::User,
            content: log.user_query.clone(),
            created_at: Some(log.timestamp),
        },
        ChatMessage {
            id: format!("b-{}", log.id),
            role: Role::Assistant,
            content: log.bot_response.clone(),
            created_at: Some(log.timestamp),
        },
    ]
}

pub fn expand_history(logs: &[ChatLog]) -> Vec<ChatMessage> {
    logs.iter().flat_map(expand_chat_log).collect()
}
