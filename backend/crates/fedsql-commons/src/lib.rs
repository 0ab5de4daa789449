//! Shared types for the FedSQL gateway.
//!
//! Everything here is dependency-light so every other crate in the
//! workspace can use it without pulling in the HTTP or SQL stacks.

pub mod constants;
pub mod ids;
pub mod value;

pub use constants::{BuiltinDatabase, DEFAULT_PROJECT, DEFAULT_TENANT, FILES_DB, INFORMATION_SCHEMA_DB};
pub use ids::{NameKey, TenantId};
pub use value::Value;
