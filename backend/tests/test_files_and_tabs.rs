//! File table round trip and tenant isolation for files and tabs.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{column, upload_request, TestServer};
use serde_json::json;

#[actix_web::test]
async fn test_file_upload_list_reupload_delete() {
    let server = TestServer::new().await;
    let app = init_app!(server);

    let req = upload_request("test_file", "test_file.csv", "a;b;c\n1;x;\n2;y;2.5\n").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/files/").to_request();
    let list: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list[0]["name"], "test_file");
    assert_eq!(list[0]["row_count"], 2);
    assert_eq!(list[0]["columns"], json!(["a", "b", "c"]));

    let (_, body) = sql!(app, "select * from files.test_file");
    assert_eq!(body["data"], json!([[1, "x", null], [2, "y", 2.5]]));

    let (_, body) = sql!(app, "show tables from files");
    assert_eq!(column(&body, "Tables_in_files"), vec![json!("test_file")]);

    // Re-upload replaces the whole table
    let req = upload_request("test_file", "test_file.json", "[{\"z\": true}, {\"z\": false}, {\"z\": null}]").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let (_, body) = sql!(app, "select * from files.test_file");
    assert_eq!(body["column_names"], json!(["z"]));
    assert_eq!(body["data"], json!([[true], [false], [null]]));

    let req = test::TestRequest::delete().uri("/api/files/test_file").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let (status, body) = sql!(app, "select * from files.test_file");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "UNKNOWN_TABLE");

    let req = test::TestRequest::delete().uri("/api/files/test_file").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Upload again after delete
    let req = upload_request("test_file", "test_file.csv", "a\n1\n").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let (_, body) = sql!(app, "select a from files.test_file");
    assert_eq!(body["data"], json!([[1]]));
}

#[actix_web::test]
async fn test_upload_over_size_limit_is_rejected() {
    let mut config = common::test_config();
    config.files.max_size_bytes = 64;
    let server = TestServer::with_config(config).await;
    let app = init_app!(server);

    let content = format!("a\n{}", "1\n".repeat(100));
    let req = upload_request("big", "big.csv", &content).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["error_code"], "FILE_TOO_LARGE");

    let req = test::TestRequest::get().uri("/api/files/").to_request();
    let list: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list, json!([]));
}

#[actix_web::test]
async fn test_tenants_do_not_share_files_or_tabs() {
    let server = TestServer::new().await;
    let app = init_app!(server);

    let req = upload_request("private", "private.csv", "a\n1\n")
        .insert_header(("company-id", "42"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = common::sql_request("show tables from files", None)
        .insert_header(("company-id", "42"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([["private"]]));

    let (_, body) = sql!(app, "show tables from files");
    assert_eq!(body["data"], json!([]));
    let (status, _) = sql!(app, "select * from files.private");
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/tabs/")
        .insert_header(("company-id", "42"))
        .set_json(json!({"tab1": "select 1", "tab2": "show databases"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/tabs/")
        .insert_header(("company-id", "42"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"tab1": "select 1", "tab2": "show databases"}));

    for tenant in [None, Some("7")] {
        let mut req = test::TestRequest::get().uri("/api/tabs/");
        if let Some(tenant) = tenant {
            req = req.insert_header(("company-id", tenant));
        }
        let body: serde_json::Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert_eq!(body, json!({}), "{:?}", tenant);
    }

    // Upserts keep other keys
    let req = test::TestRequest::post()
        .uri("/api/tabs/")
        .insert_header(("company-id", "42"))
        .set_json(json!({"tab1": "select 2"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"tab1": "select 2", "tab2": "show databases"}));
}
