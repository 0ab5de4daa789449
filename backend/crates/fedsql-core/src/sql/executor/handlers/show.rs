//! SHOW handler.
//!
//! Clients and GUI tools issue these on connect, so every statement answers
//! with the MySQL column layout even when the gateway has nothing to report.

use fedsql_commons::{Value, DEFAULT_PROJECT};
use fedsql_sql::ddl::show::like_matches;
use fedsql_sql::ddl::{ShowKind, ShowStatement};

use crate::error::GatewayResult;
use crate::predictors::MODELS_COLUMNS;
use crate::registry::DataSourceKind;
use crate::result::TableData;
use crate::sql::executor::SqlExecutor;
use crate::sql::variables::server_variables;
use crate::sql::ExecutionContext;

const FUNCTION_STATUS_COLUMNS: &[&str] = &[
    "Db",
    "Name",
    "Type",
    "Definer",
    "Modified",
    "Created",
    "Security_type",
    "Comment",
    "character_set_client",
    "collation_connection",
    "Database Collation",
];

impl SqlExecutor {
    pub(crate) async fn show(&self, show: &ShowStatement, ctx: &ExecutionContext) -> GatewayResult<TableData> {
        let tenant = ctx.tenant();
        let data = match &show.kind {
            ShowKind::Databases => TableData::new(
                vec!["Database".to_string()],
                self.registry
                    .list(tenant)
                    .iter()
                    .map(|s| vec![Value::from(s.name.as_str())])
                    .collect(),
            ),
            ShowKind::Tables { full, database } => {
                let db = match database {
                    Some(db) => self.registry.require(tenant, db)?.name.clone(),
                    None => self.registry.require(tenant, ctx.database())?.name.clone(),
                };
                let entries = self.registry.tables(tenant, &db).await?;
                let mut columns = vec![format!("Tables_in_{}", db)];
                if *full {
                    columns.push("Table_type".to_string());
                }
                let rows = entries
                    .into_iter()
                    .map(|entry| {
                        let mut row = vec![Value::from(entry.name)];
                        if *full {
                            row.push(Value::from(entry.table_type));
                        }
                        row
                    })
                    .collect();
                TableData::new(columns, rows)
            }
            ShowKind::Variables => name_value(
                server_variables()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
            ),
            ShowKind::Status => name_value(vec![
                ("Questions".to_string(), Value::Int(self.statement_count() as i64)),
                ("Threads_connected".to_string(), Value::Int(1)),
                ("Uptime".to_string(), Value::Int(self.uptime_seconds())),
            ]),
            ShowKind::Engines => TableData::new(
                ["Engine", "Support", "Comment", "Transactions", "XA", "Savepoints"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                self.registry
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
            ),
            ShowKind::Warnings => TableData::empty(&["Level", "Code", "Message"]),
            ShowKind::Charset => TableData::new(
                ["Charset", "Description", "Default collation", "Maxlen"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                vec![vec![
                    Value::from("utf8"),
                    Value::from("UTF-8 Unicode"),
                    Value::from("utf8_general_ci"),
                    Value::Int(3),
                ]],
            ),
            ShowKind::Collation => TableData::new(
                ["Collation", "Charset", "Id", "Default", "Compiled", "Sortlen"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                vec![vec![
                    Value::from("utf8_general_ci"),
                    Value::from("utf8"),
                    Value::Int(33),
                    Value::from("Yes"),
                    Value::from("Yes"),
                    Value::Int(1),
                ]],
            ),
            ShowKind::FunctionStatus | ShowKind::ProcedureStatus => TableData::empty(FUNCTION_STATUS_COLUMNS),
            ShowKind::Models { project } => {
                let project = match project {
                    Some(p) => self.registry.require_project(tenant, p)?.name.clone(),
                    None => match self.registry.get(tenant, ctx.database()) {
                        Some(source) if source.kind == DataSourceKind::Project => source.name.clone(),
                        _ => DEFAULT_PROJECT.to_string(),
                    },
                };
                TableData::new(
                    MODELS_COLUMNS.iter().map(|c| c.to_string()).collect(),
                    self.predictors
                        .summaries(tenant, Some(&project))
                        .iter()
                        .map(|s| s.to_row(false))
                        .collect(),
                )
            }
            ShowKind::Projects => TableData::new(
                vec!["project".to_string()],
                self.registry
                    .projects(tenant)
                    .iter()
                    .map(|s| vec![Value::from(s.name.as_str())])
                    .collect(),
            ),
        };
        Ok(filter_like(data, show.like.as_deref()))
    }
}

fn name_value(pairs: Vec<(String, Value)>) -> TableData {
    TableData::new(
        vec!["Variable_name".to_string(), "Value".to_string()],
        pairs.into_iter().map(|(name, value)| vec![Value::Text(name), value]).collect(),
    )
}

/// `LIKE` applies to the first column.
fn filter_like(mut data: TableData, like: Option<&str>) -> TableData {
    if let Some(pattern) = like {
        data.rows
            .retain(|row| row.first().map(|v| like_matches(pattern, &v.render())).unwrap_or(false));
    }
    data
}
