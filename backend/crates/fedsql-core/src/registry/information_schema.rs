//! Virtual `information_schema` tables, rebuilt on every read.

use fedsql_commons::{TenantId, Value};

use super::{DataSourceKind, DataSourceRegistry, InfoSchemaTable, TableSource};
use crate::result::TableData;

const SCHEMATA_COLUMNS: &[&str] = &[
    "CATALOG_NAME",
    "SCHEMA_NAME",
    "DEFAULT_CHARACTER_SET_NAME",
    "DEFAULT_COLLATION_NAME",
];
const TABLES_COLUMNS: &[&str] = &["TABLE_CATALOG", "TABLE_SCHEMA", "TABLE_NAME", "TABLE_TYPE", "TABLE_ROWS"];
const COLUMNS_COLUMNS: &[&str] = &[
    "TABLE_SCHEMA",
    "TABLE_NAME",
    "COLUMN_NAME",
    "ORDINAL_POSITION",
    "DATA_TYPE",
];
const ENGINES_COLUMNS: &[&str] = &["ENGINE", "SUPPORT", "COMMENT", "TRANSACTIONS", "XA", "SAVEPOINTS"];

pub(super) fn columns(table: InfoSchemaTable) -> Vec<String> {
    let cols = match table {
        InfoSchemaTable::Schemata => SCHEMATA_COLUMNS,
        InfoSchemaTable::Tables => TABLES_COLUMNS,
        InfoSchemaTable::Columns => COLUMNS_COLUMNS,
        InfoSchemaTable::Engines => ENGINES_COLUMNS,
    };
    cols.iter().map(|c| c.to_string()).collect()
}

impl DataSourceRegistry {
    pub(super) async fn information_schema(&self, tenant: &TenantId, table: InfoSchemaTable) -> TableData {
        let rows = match table {
            InfoSchemaTable::Schemata => self
                .list(tenant)
                .iter()
                .map(|s| {
                    vec![
                        Value::from("def"),
                        Value::from(s.name.as_str()),
                        Value::from("utf8"),
                        Value::from("utf8_general_ci"),
                    ]
                })
                .collect(),
            InfoSchemaTable::Tables => self.tables_rows(tenant).await,
            InfoSchemaTable::Columns => self.columns_rows(tenant).await,
            InfoSchemaTable::Engines => self
                .engines()
                .into_iter()
                .map(|(engine, description)| {
                    vec![
                        Value::from(engine),
                        Value::from("YES"),
                        Value::from(description),
                        Value::from("NO"),
                        Value::from("NO"),
                        Value::from("NO"),
                    ]
                })
                .collect(),
        };
        TableData::new(columns(table), rows)
    }

    /// External databases without a reachable driver are left out.
    async fn tables_rows(&self, tenant: &TenantId) -> Vec<Vec<Value>> {
        let mut rows = Vec::new();
        for source in self.list(tenant) {
            let entries = match self.tables(tenant, &source.name).await {
                Ok(entries) => entries,
                Err(e) => {
                    log::debug!("Skipping tables of '{}': {}", source.name, e);
                    continue;
                }
            };
            for entry in entries {
                let row_count = match source.kind {
                    DataSourceKind::Files => self
                        .files
                        .get(tenant, &entry.name)
                        .map(|t| Value::Int(t.rows.len() as i64))
                        .unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                rows.push(vec![
                    Value::from("def"),
                    Value::from(source.name.as_str()),
                    Value::from(entry.name),
                    Value::from(entry.table_type),
                    row_count,
                ]);
            }
        }
        rows
    }

    /// Columns of file tables and project system tables.
    async fn columns_rows(&self, tenant: &TenantId) -> Vec<Vec<Value>> {
        let mut rows = Vec::new();
        for source in self.list(tenant) {
            if !matches!(source.kind, DataSourceKind::Files | DataSourceKind::Project) {
                continue;
            }
            let Ok(entries) = self.tables(tenant, &source.name).await else {
                continue;
            };
            for entry in entries {
                let Ok(resolved) = self.resolve(tenant, &source.name, &entry.name) else {
                    continue;
                };
                let types: Vec<&'static str> = match &resolved {
                    TableSource::File(table) => (0..table.columns.len())
                        .map(|i| {
                            table
                                .rows
                                .iter()
                                .map(|r| &r[i])
                                .find(|v| !v.is_null())
                                .map(|v| v.type_name())
                                .unwrap_or("text")
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                let Ok(cols) = self.describe(tenant, &resolved).await else {
                    continue;
                };
                for (i, col) in cols.into_iter().enumerate() {
                    rows.push(vec![
                        Value::from(source.name.as_str()),
                        Value::from(entry.name.as_str()),
                        Value::from(col),
                        Value::Int(i as i64 + 1),
                        Value::from(types.get(i).copied().unwrap_or("text")),
                    ]);
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::connectors::DriverlessConnectorFactory;
    use crate::files::FileTableStore;
    use crate::jobs::TokioJobManager;
    use crate::predictors::{BaselineTrainer, PredictorManager};

    fn registry() -> DataSourceRegistry {
        DataSourceRegistry::new(
            Arc::new(FileTableStore::new(1 << 20)),
            Arc::new(PredictorManager::new(
                Arc::new(TokioJobManager::new(8)),
                Arc::new(BaselineTrainer),
                100,
            )),
            Arc::new(DriverlessConnectorFactory),
        )
    }

    #[tokio::test]
    async fn test_schemata_lists_every_database() {
        let registry = registry();
        let tenant = TenantId::default_tenant();
        let data = registry.information_schema(&tenant, InfoSchemaTable::Schemata).await;
        let names: Vec<String> = data.rows.iter().map(|r| r[1].render()).collect();
        assert_eq!(names, vec!["files", "information_schema", "mindsdb"]);
    }

    #[tokio::test]
    async fn test_tables_and_columns_include_files() {
        let registry = registry();
        let tenant = TenantId::default_tenant();
        registry
            .files
            .upload(&tenant, "t", b"a,b\n1,x\n2,y\n", None, None)
            .unwrap();
        registry
            .register(&tenant, "pg", "postgres", serde_json::json!({}))
            .unwrap();

        let tables = registry.information_schema(&tenant, InfoSchemaTable::Tables).await;
        let file_row = tables
            .rows
            .iter()
            .find(|r| r[1] == Value::from("files"))
            .unwrap();
        assert_eq!(file_row[2], Value::from("t"));
        assert_eq!(file_row[4], Value::Int(2));

        let cols = registry.information_schema(&tenant, InfoSchemaTable::Columns).await;
        let file_cols: Vec<(String, String)> = cols
            .rows
            .iter()
            .filter(|r| r[0] == Value::from("files"))
            .map(|r| (r[2].render(), r[4].render()))
            .collect();
        assert_eq!(
            file_cols,
            vec![("a".to_string(), "int".to_string()), ("b".to_string(), "text".to_string())]
        );
    }
}
