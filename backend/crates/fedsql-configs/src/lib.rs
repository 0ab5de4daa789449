//! fedsql-configs
//!
//! Server configuration types and loader for the FedSQL gateway.

pub mod config;

pub use config::defaults;
pub use config::*;
