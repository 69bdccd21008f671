//! Session token persisted in the browser as a long-lived cookie.

use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use zerodown_core::session::SESSION_KEY;
use zerodown_core::SessionId;

/// Browsers cap cookie lifetime at 400 days.
pub const COOKIE_MAX_AGE_DAYS: i64 = 400;

/// Read the session from the request cookies, minting and storing a new one
/// when it is missing or malformed.
pub fn session_from_cookies(cookies: &Cookies) -> SessionId {
    let stored = cookies.get(SESSION_KEY);
    let (session, created) = SessionId::resolve(stored.as_ref().map(|c| c.value()));

    if created {
        tracing::info!(session = %session, "Created chat session");
        cookies.add(session_cookie(&session));
    }

    session
}

pub fn session_cookie(session: &SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_KEY, session.as_str().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS))
        .build()
}
