//! Session and HTTP auth state machine, end to end.
//!
//! Disabled -> Enabled/Unauthenticated -> Enabled/Authenticated -> logout,
//! then disabling auth again without a fresh login.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{session_cookie, test_config, TestServer};
use serde_json::json;

#[actix_web::test]
async fn test_auth_state_machine() {
    let server = TestServer::new().await;
    let app = init_app!(server);

    // First contact issues a session cookie; auth is disabled so it passes
    let req = test::TestRequest::get().uri("/api/status").to_request();
    let res = test::call_service(&app, req).await;
    let cookie = session_cookie(&res).expect("session cookie on first contact");
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["auth"], json!({"http_auth_enabled": false, "confirmed": true}));

    let req = test::TestRequest::get().uri("/api/tree/").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Empty credentials leave the state untouched
    let req = test::TestRequest::put()
        .uri("/api/config/")
        .cookie(cookie.clone())
        .set_json(json!({"auth": {"http_auth_enabled": true, "username": "", "password": ""}}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");

    let req = test::TestRequest::get().uri("/api/config/").cookie(cookie.clone()).to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["auth"]["http_auth_enabled"], false);

    let req = test::TestRequest::put()
        .uri("/api/config/")
        .cookie(cookie.clone())
        .set_json(json!({"auth": {"http_auth_enabled": true, "username": "mindsdb", "password": "mindsdb"}}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Enabled/Unauthenticated: every protected scope answers 403
    for uri in ["/api/tree/", "/api/config/", "/api/files/", "/api/projects", "/api/tabs/"] {
        let req = test::TestRequest::get().uri(uri).cookie(cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
    let req = common::sql_request("select 1", None).cookie(cookie.clone()).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["error_code"], "UNAUTHENTICATED");

    // Public endpoints stay reachable
    let req = test::TestRequest::get().uri("/api/status").cookie(cookie.clone()).to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["auth"], json!({"http_auth_enabled": true, "confirmed": false}));
    let req = test::TestRequest::get().uri("/api/util/ping").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .cookie(cookie.clone())
        .set_json(json!({"username": "mindsdb", "password": "wrong"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .cookie(cookie.clone())
        .set_json(json!({"username": "mindsdb", "password": "mindsdb"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).unwrap_or(cookie);

    let req = common::sql_request("select 1", None).cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::get().uri("/api/status").cookie(cookie.clone()).to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["auth"]["confirmed"], true);

    let req = test::TestRequest::post().uri("/api/logout").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::get().uri("/api/tree/").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // Log back in, then disable: the old session keeps working without a new login
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"username": "mindsdb", "password": "mindsdb"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("login issues a session cookie");

    let req = test::TestRequest::put()
        .uri("/api/config/")
        .cookie(cookie.clone())
        .set_json(json!({"http_auth_enabled": false}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/tabs/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_auth_enabled_from_configuration() {
    let mut config = test_config();
    config.auth.http_auth_enabled = true;
    config.auth.username = "admin".to_string();
    config.auth.password = "s3cret".to_string();
    let server = TestServer::with_config(config).await;
    let app = init_app!(server);

    let req = common::sql_request("select 1", None).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"username": "admin", "password": "s3cret"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("session cookie");

    let req = common::sql_request("select 1", None).cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/config/vars").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["version"].is_string());
}
