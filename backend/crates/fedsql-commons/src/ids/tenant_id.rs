//! Type-safe wrapper for tenant identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TENANT;

/// Isolation boundary taken from the tenant request header.
///
/// Every registry, file, predictor and tab entry is keyed by a `TenantId`
/// so tenants never observe each other's state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Tenant for requests that do not name one.
    pub fn default_tenant() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Builds a tenant from a raw header value; blank values map to `fallback`.
    pub fn from_header(value: Option<&str>, fallback: &str) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Self(v.to_string()),
            _ => Self(fallback.to_string()),
        }
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::default_tenant()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
