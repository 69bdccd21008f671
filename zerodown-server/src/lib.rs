pub mod http;
pub mod render;
pub mod session;
