//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded on the span and echoed back)
//! 4. Security headers
//! 5. CORS (only when origins are configured)
//! 6. Rate limiting on `/auth` (governor)
//!
//! Bearer authentication is an extractor, [`RequireAuth`], rather than a
//! layer, so public routes need no exemption list.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::RequireAuth;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
