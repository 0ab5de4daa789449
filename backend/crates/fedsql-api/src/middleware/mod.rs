//! HTTP middleware
//!
//! [`SessionMiddleware`] wraps the whole `/api` scope and attaches a session
//! to every request; [`AuthGate`] wraps the protected scopes.

mod auth;
mod session;

pub use auth::AuthGate;
pub use session::SessionMiddleware;
