//! Chat transcript state for one session.
//!
//! A submission is a two-phase transition: `begin` tentatively appends the
//! user message and raises the loading flag, `resolve` appends either the
//! assistant reply or a compensating error message and lowers the flag.

use crate::chat::{ChatError, ChatTransport};
use crate::mapping;
use crate::models::{ChatLog, ChatMessage};
use crate::session::SessionId;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    loading: bool,
}

/// A submitted message awaiting its reply. Consumed by `Transcript::resolve`.
#[derive(Debug)]
#[must_use = "a pending turn must be resolved"]
pub struct PendingTurn {
    content: String,
}

impl PendingTurn {
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Text of the assistant bubble shown when a round-trip fails.
pub fn error_bubble_text(err: &ChatError) -> String {
    format!(
        "Sorry, the assistant could not be reached. ({})",
        err.user_detail()
    )
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(logs: &[ChatLog]) -> Self {
        let mut transcript = Self::new();
        transcript.replace(mapping::expand_history(logs));
        transcript
    }

    /// Replace the whole transcript with freshly loaded history.
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Phase one. Blank content is a no-op and returns `None`.
    pub fn begin(&mut self, content: &str) -> Option<PendingTurn> {
        if content.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(content));
        self.loading = true;
        Some(PendingTurn {
            content: content.to_string(),
        })
    }

    /// Phase two. Always appends exactly one assistant message.
    pub fn resolve(
        &mut self,
        _turn: PendingTurn,
        outcome: Result<String, ChatError>,
    ) -> &ChatMessage {
        let reply = match outcome {
            Ok(text) => ChatMessage::assistant(text),
            Err(e) => ChatMessage::assistant(error_bubble_text(&e)),
        };
        self.messages.push(reply);
        self.loading = false;
        &self.messages[self.messages.len() - 1]
    }

    /// Full round-trip for one submission. Returns the messages appended:
    /// none for blank input, otherwise the user message and one assistant
    /// message (reply or error).
    pub async fn send(
        &mut self,
        transport: &dyn ChatTransport,
        content: &str,
        session: &SessionId,
    ) -> &[ChatMessage] {
        let start = self.messages.len();
        let Some(turn) = self.begin(content) else {
            return &self.messages[start..];
        };

        let outcome = transport.send(turn.content(), session).await;
        if let Err(e) = &outcome {
            tracing::warn!(session = %session, error = %e, "Chat round-trip failed");
        }
        self.resolve(turn, outcome);
        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport returning a canned outcome and counting calls.
    struct FakeTransport {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn send(&self, _message: &str, _session: &SessionId) -> Result<String, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(r) => Ok(r.clone()),
                None => Err(ChatError::Status {
                    code: 500,
                    message: "Server Error".to_string(),
                }),
            }
        }
    }

    fn session() -> SessionId {
        SessionId::parse("sess_transcript").unwrap()
    }

    #[test]
    fn test_begin_appends_user_message_and_sets_loading() {
        let mut t = Transcript::new();
        let turn = t.begin("Is line 2 safe?").expect("non-blank input");

        assert!(t.is_loading());
        assert_eq!(t.len(), 1);
        assert_eq!(t.messages()[0].role, Role::User);
        assert_eq!(t.messages()[0].content, "Is line 2 safe?");

        t.resolve(turn, Ok("Yes.".to_string()));
        assert!(!t.is_loading());
    }

    #[test]
    fn test_blank_input_is_a_noop() {
        let mut t = Transcript::new();
        assert!(t.begin("").is_none());
        assert!(t.begin("   \n\t").is_none());
        assert!(t.is_empty());
        assert!(!t.is_loading());
    }

    #[test]
    fn test_resolve_error_appends_assistant_error() {
        let mut t = Transcript::new();
        let turn = t.begin("hello").unwrap();
        let msg = t.resolve(turn, Err(ChatError::MissingEndpoint)).clone();

        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(
            msg.content,
            "Sorry, the assistant could not be reached. (the chat endpoint is not configured)"
        );
        assert_eq!(t.len(), 2);
        assert!(!t.is_loading());
    }

    #[tokio::test]
    async fn test_successful_round_trip_appends_user_then_assistant() {
        let transport = FakeTransport::ok("Replace the filter.");
        let mut t = Transcript::new();

        let appended = t.send(&transport, "What should I do?", &session()).await.to_vec();

        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].role, Role::User);
        assert_eq!(appended[0].content, "What should I do?");
        assert_eq!(appended[1].role, Role::Assistant);
        assert_eq!(appended[1].content, "Replace the filter.");
        assert_eq!(t.len(), 2);
        assert!(!t.is_loading());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_round_trip_appends_one_error_and_clears_loading() {
        let transport = FakeTransport::failing();
        let mut t = Transcript::new();

        let appended = t.send(&transport, "hello", &session()).await.to_vec();

        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].role, Role::User);
        assert_eq!(appended[1].role, Role::Assistant);
        assert!(appended[1].content.contains("Server Error"));
        assert!(!t.is_loading());
    }

    #[tokio::test]
    async fn test_blank_send_issues_no_request() {
        let transport = FakeTransport::ok("unused");
        let mut t = Transcript::new();

        let appended = t.send(&transport, "  ", &session()).await;

        assert!(appended.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_appends_after_existing_history() {
        let logs = vec![ChatLog {
            id: 1,
            session_id: "sess_transcript".to_string(),
            timestamp: Utc::now(),
            user_query: "earlier".to_string(),
            bot_response: "earlier answer".to_string(),
        }];
        let mut t = Transcript::from_history(&logs);
        let transport = FakeTransport::ok("now");

        t.send(&transport, "again", &session()).await;

        let contents: Vec<&str> = t.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["earlier", "earlier answer", "again", "now"]);
    }
}
