//! Project and model endpoints

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use fedsql_commons::{TenantId, Value};
use fedsql_core::predictors::parse_versioned_name;
use fedsql_core::{AppContext, GatewayError, GatewayResult, TableData};
use serde::Deserialize;
use serde_json::{json, Map};

use super::map_gateway_error_to_response;
use crate::extractors::Tenant;

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// One object per input row, keyed by column name
    pub data: Vec<Map<String, serde_json::Value>>,
}

impl PredictRequest {
    /// Columns in first-seen order; keys missing from a row become null.
    pub fn to_table(&self) -> TableData {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.data {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = self
            .data
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).map(Value::from_json).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        TableData::new(columns, rows)
    }
}

/// Canonical project name, or `NotFound`.
fn project_name(app_context: &AppContext, tenant: &TenantId, project: &str) -> GatewayResult<String> {
    Ok(app_context.registry().require_project(tenant, project)?.name.clone())
}

/// GET /api/projects
pub async fn list_projects_handler(app_context: web::Data<Arc<AppContext>>, tenant: Tenant) -> HttpResponse {
    let projects: Vec<_> = app_context
        .registry()
        .projects(&tenant.0)
        .iter()
        .map(|p| json!({ "name": p.name }))
        .collect();
    HttpResponse::Ok().json(projects)
}

/// GET /api/projects/{project}/models
pub async fn list_models_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<String>,
) -> HttpResponse {
    let project = match project_name(&app_context, &tenant.0, &path.into_inner()) {
        Ok(project) => project,
        Err(err) => return map_gateway_error_to_response(&err),
    };
    HttpResponse::Ok().json(app_context.predictors().summaries(&tenant.0, Some(&project)))
}

/// GET /api/projects/{project}/models/{name}
///
/// `name` may carry a version suffix (`rentals.2`). The `training` field
/// holds the version's training job while the job history still has it.
pub async fn get_model_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (project, raw_name) = path.into_inner();
    let result = project_name(&app_context, &tenant.0, &project).and_then(|project| {
        let (name, version) = parse_versioned_name(&raw_name);
        let record = app_context.predictors().record(&tenant.0, &project, &name)?;
        let selected = match version {
            Some(v) => record.version(v),
            None => record.active(),
        };
        selected
            .map(|v| (record.summary(v), app_context.job_manager().get_job_status(&v.job_id)))
            .ok_or_else(|| GatewayError::NotFound(format!("model '{}.{}'", project, raw_name)))
    });
    match result {
        Ok((summary, training)) => {
            let mut body = json!(summary);
            body["training"] = json!(training);
            HttpResponse::Ok().json(body)
        }
        Err(err) => map_gateway_error_to_response(&err),
    }
}

/// DELETE /api/projects/{project}/models/{name}
pub async fn delete_model_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (project, name) = path.into_inner();
    let result = project_name(&app_context, &tenant.0, &project)
        .and_then(|project| app_context.predictors().drop_predictor(&tenant.0, &project, &name));
    match result {
        Ok(()) => HttpResponse::Ok().json(json!({ "name": name })),
        Err(err) => map_gateway_error_to_response(&err),
    }
}

/// POST /api/projects/{project}/models/{name}[.{version}]/predict
///
/// Answers one object per input row: the input columns plus the prediction
/// columns. Without a version the latest complete version serves.
pub async fn predict_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<(String, String)>,
    body: web::Json<PredictRequest>,
) -> HttpResponse {
    let (project, raw_name) = path.into_inner();
    let (name, version) = parse_versioned_name(&raw_name);
    let input = body.to_table();

    let result = project_name(&app_context, &tenant.0, &project).and_then(|project| {
        app_context
            .predictors()
            .predict(&tenant.0, &project, &name, version, &input)
    });
    match result {
        Ok(predictions) => HttpResponse::Ok().json(predictions.to_json_records()),
        Err(err) => map_gateway_error_to_response(&err),
    }
}
