//! Session middleware configuration.
//!
//! Sessions are kept server-side (Postgres via `tower-sessions-sqlx-store`,
//! or the in-process `MemoryStore` when no database is configured). The
//! cookie only carries the session id, signed with the configured secret.

use axum::Router;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, cookie::SameSite};

use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dyf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Wrap `router` in a signed-cookie session layer backed by `store`.
pub fn with_sessions<S>(router: Router, store: S, state: &AppState) -> Router
where
    S: SessionStore + Clone,
{
    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(state.config().is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(state.session_key().clone());

    router.layer(layer)
}
