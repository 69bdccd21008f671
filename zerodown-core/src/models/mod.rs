pub mod chat;
pub mod ticket;

pub use chat::{ChatLog, ChatMessage, Role};
pub use ticket::{FailureTicket, TicketView, Variant};
