//! HTTP request handlers
//!
//! ## Endpoints (under the configured prefix, `/api` by default)
//! - POST /sql/query - Execute one SQL statement
//! - GET /status - Environment, version and auth state (public)
//! - GET /util/ping, GET /util/ping_native, GET /config/vars (public)
//! - GET|PUT /config/ - Read or update the HTTP auth configuration
//! - POST /login, POST /logout
//! - GET /tree/, GET /tree/{db}
//! - GET /files/, PUT /files/{name}, DELETE /files/{name}
//! - GET /projects, GET /projects/{project}/models, GET|DELETE /projects/{project}/models/{name},
//!   POST /projects/{project}/models/{name}/predict
//! - GET|POST /tabs/

pub mod auth;
pub mod config;
pub mod files;
pub mod projects;
pub mod sql;
pub mod status;
pub mod tabs;
pub mod tree;

pub use auth::{login_handler, logout_handler};
pub use config::{get_config_handler, put_config_handler, vars_handler};
pub use files::{delete_file_handler, list_files_handler, upload_file_handler};
pub use projects::{
    delete_model_handler, get_model_handler, list_models_handler, list_projects_handler,
    predict_handler,
};
pub use sql::query_handler;
pub use status::{ping_handler, status_handler};
pub use tabs::{get_tabs_handler, save_tabs_handler};
pub use tree::{tree_handler, tree_tables_handler};

use actix_web::HttpResponse;
use fedsql_auth::AuthError;
use fedsql_core::GatewayError;

use crate::models::{ErrorCode, ErrorResponse};

/// Map gateway errors on REST resources. Missing resources answer 404 here,
/// unlike the SQL envelope.
pub(crate) fn map_gateway_error_to_response(err: &GatewayError) -> HttpResponse {
    let code = ErrorCode::from(err);
    let status = if code.is_not_found() {
        actix_web::http::StatusCode::NOT_FOUND
    } else {
        code.status()
    };
    if status.is_server_error() {
        log::error!("Request failed: {}", err);
    }
    HttpResponse::build(status).json(ErrorResponse::new(code, err.to_string()))
}

/// Map authentication errors. Hashing failures are not echoed to the client.
pub(crate) fn map_auth_error_to_response(err: &AuthError) -> HttpResponse {
    let code = ErrorCode::from(err);
    let message = match err {
        AuthError::HashingError(detail) => {
            log::error!("Password hashing failed: {}", detail);
            "Authentication failed".to_string()
        }
        other => other.to_string(),
    };
    HttpResponse::build(code.status()).json(ErrorResponse::new(code, message))
}
