// FedSQL Authentication Library
// Session tracking, the global HTTP auth switch, cookie helpers and bcrypt hashing

pub mod cookie;
pub mod error;
pub mod manager;
pub mod password;
pub mod session;

pub use cookie::CookieConfig;
pub use error::{AuthError, AuthResult};
pub use manager::{AuthManager, AuthStatus, AuthUpdate};
pub use session::{Session, SessionId, SessionStore};
