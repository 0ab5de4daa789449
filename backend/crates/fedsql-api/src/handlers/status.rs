//! Public status endpoints

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use fedsql_auth::AuthManager;
use fedsql_core::AppContext;
use serde_json::json;

use crate::extractors::CurrentSession;

/// GET /api/status
///
/// `confirmed` tells the GUI whether this session may use protected routes.
pub async fn status_handler(
    app_context: web::Data<Arc<AppContext>>,
    auth: web::Data<AuthManager>,
    session: CurrentSession,
) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "environment": app_context.config().server.environment,
        "version": app_context.server_version(),
        "uptime_seconds": app_context.uptime_seconds(),
        "auth": {
            "http_auth_enabled": auth.is_enabled(),
            "confirmed": auth.is_authorized(session.as_ref()),
        }
    }))
}

/// GET /api/util/ping, GET /api/util/ping_native
pub async fn ping_handler() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
