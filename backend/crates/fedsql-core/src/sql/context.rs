use fedsql_commons::{TenantId, DEFAULT_PROJECT};

/// Per-statement execution context.
///
/// `database` is the session's active database; `USE` replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    tenant: TenantId,
    database: String,
    connection_id: u64,
}

impl ExecutionContext {
    pub fn new(tenant: TenantId, database: impl Into<String>) -> Self {
        Self {
            tenant,
            database: database.into(),
            connection_id: 0,
        }
    }

    pub fn with_connection_id(mut self, connection_id: u64) -> Self {
        self.connection_id = connection_id;
        self
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = database.into();
    }

    /// Same tenant, different active database.
    pub fn for_database(&self, database: impl Into<String>) -> Self {
        Self {
            tenant: self.tenant.clone(),
            database: database.into(),
            connection_id: self.connection_id,
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(TenantId::default_tenant(), DEFAULT_PROJECT)
    }
}
