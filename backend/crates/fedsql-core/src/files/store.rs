use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fedsql_commons::{NameKey, TenantId, Value};
use serde::Serialize;

use super::parser::{parse_payload, FileFormat};
use crate::error::{GatewayError, GatewayResult};
use crate::result::TableData;

/// One uploaded table. Immutable once stored; re-upload swaps the `Arc`.
#[derive(Debug, Clone)]
pub struct FileTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub original_filename: Option<String>,
    pub format: FileFormat,
    pub size_bytes: usize,
    pub created_at: DateTime<Utc>,
}

impl FileTable {
    pub fn to_table_data(&self, limit: Option<usize>) -> TableData {
        let rows = match limit {
            Some(n) => self.rows.iter().take(n).cloned().collect(),
            None => self.rows.clone(),
        };
        TableData::new(self.columns.clone(), rows)
    }

    pub fn info(&self) -> FileTableInfo {
        FileTableInfo {
            name: self.name.clone(),
            original_filename: self.original_filename.clone(),
            row_count: self.rows.len(),
            columns: self.columns.clone(),
            format: self.format,
            size_bytes: self.size_bytes,
            created_at: self.created_at,
        }
    }
}

/// Listing entry for `GET /api/files/`.
#[derive(Debug, Clone, Serialize)]
pub struct FileTableInfo {
    pub name: String,
    pub original_filename: Option<String>,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub format: FileFormat,
    pub size_bytes: usize,
    pub created_at: DateTime<Utc>,
}

pub struct FileTableStore {
    tables: DashMap<NameKey, Arc<FileTable>>,
    max_size_bytes: usize,
}

impl FileTableStore {
    pub fn new(max_size_bytes: usize) -> Self {
        Self {
            tables: DashMap::new(),
            max_size_bytes,
        }
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    /// Parse and store `payload` as `files.<name>`, replacing any previous table.
    pub fn upload(
        &self,
        tenant: &TenantId,
        name: &str,
        payload: &[u8],
        filename: Option<&str>,
        original_filename: Option<&str>,
    ) -> GatewayResult<Arc<FileTable>> {
        validate_table_name(name)?;
        if payload.len() > self.max_size_bytes {
            return Err(GatewayError::Validation(format!(
                "File is {} bytes, limit is {} bytes",
                payload.len(),
                self.max_size_bytes
            )));
        }

        let hint = filename.or(original_filename);
        let parsed = parse_payload(payload, hint)?;
        let table = Arc::new(FileTable {
            name: name.to_string(),
            columns: parsed.columns,
            rows: parsed.rows,
            original_filename: original_filename.or(filename).map(str::to_string),
            format: parsed.format,
            size_bytes: payload.len(),
            created_at: Utc::now(),
        });

        let replaced = self
            .tables
            .insert(NameKey::new(tenant, name), Arc::clone(&table))
            .is_some();
        log::info!(
            "{} file table '{}' for tenant {}: {} rows, {} columns",
            if replaced { "Replaced" } else { "Stored" },
            name,
            tenant,
            table.rows.len(),
            table.columns.len()
        );
        Ok(table)
    }

    pub fn get(&self, tenant: &TenantId, name: &str) -> Option<Arc<FileTable>> {
        self.tables
            .get(&NameKey::new(tenant, name))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn delete(&self, tenant: &TenantId, name: &str) -> GatewayResult<()> {
        match self.tables.remove(&NameKey::new(tenant, name)) {
            Some(_) => {
                log::info!("Deleted file table '{}' for tenant {}", name, tenant);
                Ok(())
            }
            None => Err(GatewayError::NotFound(format!("file '{}'", name))),
        }
    }

    /// Tables of `tenant`, sorted by name.
    pub fn list(&self, tenant: &TenantId) -> Vec<FileTableInfo> {
        let mut infos: Vec<FileTableInfo> = self
            .tables
            .iter()
            .filter(|entry| entry.key().belongs_to(tenant))
            .map(|entry| entry.value().info())
            .collect();
        infos.sort_by_key(|i| i.name.to_lowercase());
        infos
    }

    pub fn table_names(&self, tenant: &TenantId) -> Vec<String> {
        self.list(tenant).into_iter().map(|i| i.name).collect()
    }
}

/// ASCII letters, digits and underscores.
pub fn validate_table_name(name: &str) -> GatewayResult<()> {
    if name.is_empty() || name.len() > 128 {
        return Err(GatewayError::Validation(
            "File name must be between 1 and 128 characters".to_string(),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GatewayError::Validation(format!(
            "Invalid file name '{}': only letters, digits and '_' are allowed",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENTALS: &[u8] = b"sqft,location,rental_price\n917,great,3901\n194,poor,1146\n";

    #[test]
    fn test_upload_then_get_and_list() {
        let store = FileTableStore::new(1024);
        let tenant = TenantId::default_tenant();
        store
            .upload(&tenant, "rentals", RENTALS, Some("rentals.csv"), Some("home_rentals.csv"))
            .unwrap();

        let table = store.get(&tenant, "RENTALS").unwrap();
        assert_eq!(table.rows.len(), 2);
        let listed = store.list(&tenant);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].original_filename.as_deref(), Some("home_rentals.csv"));
        assert_eq!(listed[0].row_count, 2);
    }

    #[test]
    fn test_reupload_replaces_table() {
        let store = FileTableStore::new(1024);
        let tenant = TenantId::default_tenant();
        store.upload(&tenant, "t", RENTALS, None, None).unwrap();
        let before = store.get(&tenant, "t").unwrap();
        store.upload(&tenant, "t", b"a\n1\n", None, None).unwrap();

        let after = store.get(&tenant, "t").unwrap();
        assert_eq!(after.columns, vec!["a"]);
        // Readers holding the old snapshot keep it intact
        assert_eq!(before.rows.len(), 2);
        assert_eq!(store.list(&tenant).len(), 1);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = FileTableStore::new(1024);
        let tenant = TenantId::default_tenant();
        assert!(matches!(store.delete(&tenant, "nope"), Err(GatewayError::NotFound(_))));
    }

    #[test]
    fn test_rejects_oversized_and_bad_names() {
        let store = FileTableStore::new(8);
        let tenant = TenantId::default_tenant();
        assert!(matches!(
            store.upload(&tenant, "t", RENTALS, None, None),
            Err(GatewayError::Validation(_))
        ));
        let store = FileTableStore::new(1024);
        assert!(store.upload(&tenant, "bad name", RENTALS, None, None).is_err());
        assert!(store.upload(&tenant, "", RENTALS, None, None).is_err());
    }

    #[test]
    fn test_tenants_are_isolated() {
        let store = FileTableStore::new(1024);
        let a = TenantId::new("a");
        let b = TenantId::new("b");
        store.upload(&a, "t", RENTALS, None, None).unwrap();
        assert!(store.get(&b, "t").is_none());
        assert!(store.list(&b).is_empty());
    }

    #[test]
    fn test_readers_during_reupload_see_whole_tables() {
        let store = FileTableStore::new(1024);
        let tenant = TenantId::default_tenant();
        let narrow: &[u8] = b"a\n1\n2\n3\n";
        store.upload(&tenant, "t", RENTALS, None, None).unwrap();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200 {
                    let payload = if i % 2 == 0 { narrow } else { RENTALS };
                    store.upload(&tenant, "t", payload, None, None).unwrap();
                }
            });
            for _ in 0..2 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let table = store.get(&tenant, "t").unwrap();
                        match table.columns.len() {
                            1 => assert_eq!(table.rows.len(), 3),
                            3 => assert_eq!(table.rows.len(), 2),
                            n => panic!("unexpected column count {}", n),
                        }
                        assert!(table.rows.iter().all(|r| r.len() == table.columns.len()));
                    }
                });
            }
        });
        assert_eq!(store.list(&tenant).len(), 1);
    }
}
