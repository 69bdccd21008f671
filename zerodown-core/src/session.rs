//! Per-browser chat session token.
//!
//! The token is not a credential; it only correlates chat turns across page
//! reloads. It is passed explicitly to every data-access call.

use std::fmt;

use rand::Rng;

use serde::{Deserialize, Serialize};

/// Browser storage key under which the token is kept.
pub const SESSION_KEY: &str = "chat_session_id";

const PREFIX: &str = "sess_";
const SUFFIX_LEN: usize = 9;
const MAX_LEN: usize = 64;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// New token: `sess_` followed by nine base-36 characters.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{PREFIX}{suffix}"))
    }

    /// Accept a stored token if it is well formed.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(raw.to_string()))
    }

    /// Reuse `stored` when valid, otherwise mint a new token. The flag is
    /// true when a new token was created and must be persisted.
    pub fn resolve(stored: Option<&str>) -> (Self, bool) {
        match stored.and_then(Self::parse) {
            Some(id) => (id, false),
            None => (Self::generate(), true),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
