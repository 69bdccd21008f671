pub mod chat;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod mapping;
pub mod models;
pub mod session;
pub mod store;
pub mod transcript;

pub use chat::{ChatError, ChatTransport, HttpChatClient};
pub use config::ZeroDownConfig;
pub use dashboard::Dashboard;
pub use error::ZeroDownError;
pub use models::{ChatLog, ChatMessage, FailureTicket, Role, TicketView, Variant};
pub use session::SessionId;
pub use store::{ChatLogStore, PgStore, TicketStore};
pub use transcript::{PendingTurn, Transcript};
