//! Database tree for the GUI sidebar

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use fedsql_core::registry::{DataSourceKind, MODEL_TABLE};
use fedsql_core::AppContext;
use serde::Serialize;

use super::map_gateway_error_to_response;
use crate::extractors::Tenant;

#[derive(Debug, Clone, Serialize)]
pub struct TreeTable {
    pub name: String,
    pub class: &'static str,
    #[serde(rename = "type")]
    pub table_type: &'static str,
    pub deletable: bool,
}

/// GET /api/tree/
pub async fn tree_handler(app_context: web::Data<Arc<AppContext>>, tenant: Tenant) -> HttpResponse {
    let databases: Vec<_> = app_context
        .registry()
        .list(&tenant.0)
        .iter()
        .map(|source| source.info())
        .collect();
    HttpResponse::Ok().json(databases)
}

/// GET /api/tree/{db}
///
/// Uploaded files and models can be deleted; everything else is read-only.
pub async fn tree_tables_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<String>,
) -> HttpResponse {
    let registry = app_context.registry();
    let db = path.into_inner();
    let source = match registry.require(&tenant.0, &db) {
        Ok(source) => source,
        Err(err) => return map_gateway_error_to_response(&err),
    };
    let entries = match registry.tables(&tenant.0, &source.name).await {
        Ok(entries) => entries,
        Err(err) => return map_gateway_error_to_response(&err),
    };

    let tables: Vec<TreeTable> = entries
        .into_iter()
        .map(|entry| {
            let is_model = entry.table_type == MODEL_TABLE;
            TreeTable {
                name: entry.name,
                class: if is_model { "model" } else { "table" },
                table_type: entry.table_type,
                deletable: is_model || source.kind == DataSourceKind::Files,
            }
        })
        .collect();
    HttpResponse::Ok().json(tables)
}
