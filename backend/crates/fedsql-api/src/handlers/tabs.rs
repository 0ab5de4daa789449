//! Editor tabs, scoped by the tenant header.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use fedsql_core::AppContext;

use super::map_gateway_error_to_response;
use crate::extractors::Tenant;

/// GET /api/tabs/
pub async fn get_tabs_handler(app_context: web::Data<Arc<AppContext>>, tenant: Tenant) -> HttpResponse {
    HttpResponse::Ok().json(app_context.tabs().get(&tenant.0))
}

/// POST /api/tabs/
///
/// Body is an object of tab name to text; keys are upserted.
pub async fn save_tabs_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let tabs = app_context.tabs();
    match tabs.set_all(&tenant.0, &body) {
        Ok(()) => HttpResponse::Ok().json(tabs.get(&tenant.0)),
        Err(err) => map_gateway_error_to_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fedsql_core::AppContext;
    use serde_json::json;

    use crate::test_support::auth_manager;

    #[actix_web::test]
    async fn test_tabs_are_isolated_by_tenant() {
        let app = init_test_app!(AppContext::new_test(), auth_manager());

        let req = test::TestRequest::post()
            .uri("/api/tabs/")
            .insert_header(("company-id", "1"))
            .set_json(json!({"tab1": "select 1"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/tabs/")
            .insert_header(("company-id", "1"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"tab1": "select 1"}));

        let req = test::TestRequest::get()
            .uri("/api/tabs/")
            .insert_header(("company-id", "2"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({}));

        let req = test::TestRequest::post()
            .uri("/api/tabs/")
            .set_json(json!({"tab1": 5}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
