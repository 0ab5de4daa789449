//! Type-safe identifiers.

mod name_key;
mod tenant_id;

pub use name_key::NameKey;
pub use tenant_id::TenantId;
