//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction) - added in `main`
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions, signed cookie)

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, clear_session_user, refresh_session_user,
    set_session_user,
};
pub use flash::{set_flash, take_flash};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::with_sessions;
