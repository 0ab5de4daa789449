//! Gateway configuration endpoints
//!
//! GET /api/config/ and PUT /api/config/ sit behind the auth gate;
//! GET /api/config/vars is public.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use fedsql_auth::{AuthManager, AuthStatus, AuthUpdate};
use fedsql_core::AppContext;
use serde::Deserialize;
use serde_json::json;

use super::map_auth_error_to_response;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthFields {
    pub http_auth_enabled: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Body of `PUT /api/config/`: `{"auth": {...}}`, or the same keys at the
/// top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigUpdateRequest {
    Nested { auth: AuthFields },
    Flat(AuthFields),
}

impl ConfigUpdateRequest {
    pub fn into_auth_update(self) -> AuthUpdate {
        let fields = match self {
            ConfigUpdateRequest::Nested { auth } => auth,
            ConfigUpdateRequest::Flat(fields) => fields,
        };
        AuthUpdate {
            http_auth_enabled: fields.http_auth_enabled,
            username: fields.username,
            password: fields.password,
        }
    }
}

fn config_body(app_context: &AppContext, status: AuthStatus) -> serde_json::Value {
    json!({
        "auth": status,
        "environment": app_context.config().server.environment,
    })
}

/// GET /api/config/
pub async fn get_config_handler(
    app_context: web::Data<Arc<AppContext>>,
    auth: web::Data<AuthManager>,
) -> HttpResponse {
    HttpResponse::Ok().json(config_body(&app_context, auth.status()))
}

/// PUT /api/config/
///
/// Enabling auth needs a username and a password; on failure nothing changes.
pub async fn put_config_handler(
    app_context: web::Data<Arc<AppContext>>,
    auth: web::Data<AuthManager>,
    body: web::Json<ConfigUpdateRequest>,
) -> HttpResponse {
    match auth.update(body.into_inner().into_auth_update()).await {
        Ok(status) => HttpResponse::Ok().json(config_body(&app_context, status)),
        Err(err) => map_auth_error_to_response(&err),
    }
}

/// GET /api/config/vars
pub async fn vars_handler(app_context: web::Data<Arc<AppContext>>) -> HttpResponse {
    let config = app_context.config();
    HttpResponse::Ok().json(json!({
        "version": app_context.server_version(),
        "environment": config.server.environment,
        "max_file_size_bytes": config.files.max_size_bytes,
        "max_result_rows": config.limits.max_result_rows,
    }))
}
