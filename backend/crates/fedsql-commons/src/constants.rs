//! Names of the databases that exist for every tenant.

/// Virtual catalog database.
pub const INFORMATION_SCHEMA_DB: &str = "information_schema";

/// Database holding uploaded file tables.
pub const FILES_DB: &str = "files";

/// Default project for predictors.
pub const DEFAULT_PROJECT: &str = "mindsdb";

/// Tenant used when a request carries no tenant header.
pub const DEFAULT_TENANT: &str = "0";

/// Built-in databases. They cannot be created, dropped or shadowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinDatabase {
    InformationSchema,
    Files,
    DefaultProject,
}

impl BuiltinDatabase {
    pub const ALL: [BuiltinDatabase; 3] = [
        BuiltinDatabase::InformationSchema,
        BuiltinDatabase::Files,
        BuiltinDatabase::DefaultProject,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinDatabase::InformationSchema => INFORMATION_SCHEMA_DB,
            BuiltinDatabase::Files => FILES_DB,
            BuiltinDatabase::DefaultProject => DEFAULT_PROJECT,
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_ignores_case() {
        assert_eq!(BuiltinDatabase::from_name("FILES"), Some(BuiltinDatabase::Files));
        assert_eq!(
            BuiltinDatabase::from_name("Information_Schema"),
            Some(BuiltinDatabase::InformationSchema)
        );
        assert_eq!(BuiltinDatabase::from_name("pg"), None);
    }
}
