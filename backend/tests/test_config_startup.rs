//! Startup from a configuration file: sections flow into the running app.

#[macro_use]
mod common;

use std::io::Write;

use actix_web::http::StatusCode;
use actix_web::test;
use fedsql_configs::ServerConfig;
use serde_json::json;

#[actix_web::test]
async fn test_config_file_drives_prefix_tenancy_and_limits() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
api_prefix = "/gateway/"
environment = "staging"

[tenancy]
header = "X-Tenant"
default_tenant = "public"

[limits]
max_result_rows = 3

[auth]
bcrypt_cost = 4
"#
    )
    .unwrap();

    let config = ServerConfig::load_or_default(file.path()).unwrap();
    assert_eq!(config.server.api_prefix, "/gateway");
    assert_eq!(config.tenancy.header, "x-tenant");

    let server = common::TestServer::with_config(config).await;
    let app = init_app!(server);

    let req = test::TestRequest::get().uri("/gateway/status").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["environment"], "staging");

    let req = test::TestRequest::get().uri("/api/status").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/gateway/tabs/")
        .insert_header(("x-tenant", "acme"))
        .set_json(json!({"t": "select 1"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::get()
        .uri("/gateway/tabs/")
        .insert_header(("company-id", "acme"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({}));

    let csv = format!("n\n{}", (0..10).map(|i| format!("{}\n", i)).collect::<String>());
    let tenant = fedsql_commons::TenantId::new("public");
    server
        .app_context()
        .files()
        .upload(&tenant, "numbers", csv.as_bytes(), Some("numbers.csv"), None)
        .unwrap();
    let req = test::TestRequest::post()
        .uri("/gateway/sql/query")
        .set_json(json!({"query": "select n from files.numbers"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([[0], [1], [2]]));
}

#[actix_web::test]
async fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.server.api_prefix, "/api");
    assert_eq!(config.tenancy.header, "company-id");
    assert_eq!(config.tenancy.default_tenant, "0");
    assert!(!config.auth.http_auth_enabled);
}

#[actix_web::test]
async fn test_invalid_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[logging]\nlevel = \"chatty\"").unwrap();
    assert!(ServerConfig::load_or_default(file.path()).is_err());
}

#[actix_web::test]
async fn test_example_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml");
    let example = ServerConfig::from_file(path).unwrap();
    let defaults = ServerConfig::default();
    assert_eq!(example.server.port, defaults.server.port);
    assert_eq!(example.server.api_prefix, defaults.server.api_prefix);
    assert_eq!(example.files.max_size_bytes, defaults.files.max_size_bytes);
    assert_eq!(example.limits.max_result_rows, defaults.limits.max_result_rows);
    assert_eq!(example.auth.cookie_name, defaults.auth.cookie_name);
    assert_eq!(example.security.cors.allowed_headers, defaults.security.cors.allowed_headers);
}
