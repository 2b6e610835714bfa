//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, bounded moka store)
//! 4. Security headers (strict CSP, no caching)

pub mod security_headers;
pub mod session;

pub use security_headers::security_headers_middleware;
pub use session::{MAX_SESSIONS, SESSION_COOKIE_NAME, create_session_layer};
