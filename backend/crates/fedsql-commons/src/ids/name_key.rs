//! Case-insensitive key for user-visible names.

use std::fmt;

use crate::ids::TenantId;

/// `(tenant, lowercased name)` pair used as the key of every tenant-scoped map.
///
/// The display spelling of a name is stored next to the value; the key only
/// exists so `PG`, `pg` and `Pg` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey {
    tenant: TenantId,
    name: String,
}

impl NameKey {
    pub fn new(tenant: &TenantId, name: &str) -> Self {
        Self {
            tenant: tenant.clone(),
            name: name.to_lowercase(),
        }
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Lowercased name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn belongs_to(&self, tenant: &TenantId) -> bool {
        &self.tenant == tenant
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tenant, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_collide_across_case_but_not_tenants() {
        let t0 = TenantId::new("0");
        let t1 = TenantId::new("1");
        assert_eq!(NameKey::new(&t0, "PG"), NameKey::new(&t0, "pg"));
        assert_ne!(NameKey::new(&t0, "pg"), NameKey::new(&t1, "pg"));
        assert!(NameKey::new(&t1, "x").belongs_to(&t1));
    }
}
