//! SQL handler
//!
//! POST /api/sql/query - Execute one statement and answer with the
//! TABLE/OK/ERROR envelope.

use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, HttpResponse};
use fedsql_auth::AuthManager;
use fedsql_core::sql::ExecutionContext;
use fedsql_core::{AppContext, SqlContext};

use crate::extractors::{CurrentSession, Tenant};
use crate::models::{QueryRequest, QueryResponse};

/// POST /api/sql/query
///
/// The request's `context.db` becomes the active database; the response
/// carries the context after the statement (`USE` changes it). Errors echo
/// the request context unchanged. `CONNECTION_ID()` reports the session's id.
pub async fn query_handler(
    app_context: web::Data<Arc<AppContext>>,
    auth: Option<web::Data<AuthManager>>,
    session: CurrentSession,
    tenant: Tenant,
    body: web::Json<QueryRequest>,
) -> HttpResponse {
    let start_time = Instant::now();
    let request = body.into_inner();
    let before = request.context_or_default();

    let connection_id = match (auth, session.as_ref()) {
        (Some(auth), Some(session)) => auth.connection_id(session).unwrap_or(0),
        _ => 0,
    };
    let mut ctx =
        ExecutionContext::new(tenant.into_inner(), before.db.clone()).with_connection_id(connection_id);
    let outcome = app_context.sql_executor().execute(&request.query, &mut ctx).await;
    let after = SqlContext::new(ctx.database());

    let took_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    match &outcome {
        Ok(_) => log::debug!("SQL ok in {:.3}ms (tenant={}, db={})", took_ms, ctx.tenant(), after.db),
        Err(e) => log::debug!("SQL failed in {:.3}ms (tenant={}): {}", took_ms, ctx.tenant(), e),
    }

    let (status, response) = QueryResponse::from_outcome(&outcome, before, after);
    HttpResponse::build(status).json(response)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fedsql_core::AppContext;
    use serde_json::json;

    use crate::models::{QueryResponse, ResponseType};
    use crate::test_support::{auth_manager, session_cookie};

    fn query(sql: &str, db: Option<&str>) -> test::TestRequest {
        let mut body = json!({ "query": sql });
        if let Some(db) = db {
            body["context"] = json!({ "db": db });
        }
        test::TestRequest::post().uri("/api/sql/query").set_json(body)
    }

    macro_rules! run {
        ($app:expr, $sql:expr, $db:expr) => {{
            let res = test::call_service(&$app, query($sql, $db).to_request()).await;
            let status: StatusCode = res.status();
            let response: QueryResponse = test::read_body_json(res).await;
            (status, response)
        }};
    }

    #[actix_web::test]
    async fn test_constant_select_envelope() {
        let app = init_test_app!(AppContext::new_test(), auth_manager());
        let (status, response) = run!(app, "select 1 as a, 'x', 2.5", None);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.response_type, ResponseType::Table);
        assert_eq!(
            response.column_names,
            Some(vec!["a".to_string(), "x".to_string(), "2.5".to_string()])
        );
        assert_eq!(response.data, Some(vec![vec![json!(1), json!("x"), json!(2.5)]]));
        assert_eq!(response.context.db, "mindsdb");
    }

    #[actix_web::test]
    async fn test_use_switches_context_and_errors_keep_it() {
        let app = init_test_app!(AppContext::new_test(), auth_manager());
        let (status, response) = run!(app, "use files", None);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.response_type, ResponseType::Ok);
        assert_eq!(response.context.db, "files");

        let (status, response) = run!(app, "use nowhere", Some("files"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.response_type, ResponseType::Error);
        assert_eq!(response.error_code.as_deref(), Some("UNKNOWN_DATABASE"));
        assert_eq!(response.context.db, "files");
    }

    #[actix_web::test]
    async fn test_parse_error_and_bad_body() {
        let app = init_test_app!(AppContext::new_test(), auth_manager());
        let (status, response) = run!(app, "selec 1", None);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response.error_message.is_some());

        let req = test::TestRequest::post()
            .uri("/api/sql/query")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error_code"], "INVALID_INPUT");
    }

    #[actix_web::test]
    async fn test_connection_id_follows_the_session() {
        let app = init_test_app!(AppContext::new_test(), auth_manager());
        let res = test::call_service(&app, query("select connection_id() as id", None).to_request()).await;
        let first_cookie = session_cookie(&res).expect("session cookie");
        let first: QueryResponse = test::read_body_json(res).await;
        let first_id = first.data.unwrap()[0][0].as_u64().unwrap();
        assert!(first_id > 0);

        let req = query("select connection_id() as id", None)
            .cookie(first_cookie)
            .to_request();
        let again: QueryResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(again.data.unwrap()[0][0].as_u64(), Some(first_id));

        let (_, other) = run!(app, "select connection_id() as id", None);
        assert_ne!(other.data.unwrap()[0][0].as_u64(), Some(first_id));
    }

    #[actix_web::test]
    async fn test_forbidden_drop_is_403() {
        let app = init_test_app!(AppContext::new_test(), auth_manager());
        let (status, response) = run!(app, "drop database files", None);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(response.error_code.as_deref(), Some("FORBIDDEN"));
    }
}
