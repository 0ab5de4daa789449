//! Login and logout
//!
//! POST /api/login - Verify credentials and rotate the session cookie
//! POST /api/logout - Destroy the session and expire the cookie

use actix_web::{web, HttpResponse};
use fedsql_auth::cookie::{create_logout_cookie, create_session_cookie};
use fedsql_auth::AuthManager;
use serde::{Deserialize, Serialize};

use super::map_auth_error_to_response;
use crate::extractors::CurrentSession;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login
///
/// With auth disabled this succeeds without checking anything.
pub async fn login_handler(
    auth: web::Data<AuthManager>,
    session: CurrentSession,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    match auth.login(session.as_ref(), &body.username, &body.password).await {
        Ok(new_session) => {
            let cookie = create_session_cookie(&new_session, auth.cookie_config());
            HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
                "authenticated": auth.is_session_authenticated(&new_session),
                "http_auth_enabled": auth.is_enabled(),
            }))
        }
        Err(err) => map_auth_error_to_response(&err),
    }
}

/// POST /api/logout
pub async fn logout_handler(auth: web::Data<AuthManager>, session: CurrentSession) -> HttpResponse {
    if let Some(id) = session.as_ref() {
        auth.logout(id);
    }
    HttpResponse::Ok()
        .cookie(create_logout_cookie(auth.cookie_config()))
        .json(serde_json::json!({
            "message": "Logged out successfully"
        }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use fedsql_auth::AuthUpdate;
    use fedsql_core::AppContext;
    use serde_json::json;

    use crate::test_support::{auth_manager, session_cookie};

    #[actix_web::test]
    async fn test_login_logout_cycle() {
        let auth = auth_manager();
        auth.update(AuthUpdate {
            http_auth_enabled: Some(true),
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
        })
        .await
        .unwrap();
        let app = init_test_app!(AppContext::new_test(), auth.clone());

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"username": "admin", "password": "wrong"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"username": "admin", "password": "secret"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res).expect("login cookie");

        let req = test::TestRequest::get().uri("/api/tabs/").cookie(cookie.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post().uri("/api/logout").cookie(cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(session_cookie(&res).map(|c| c.value().to_string()), Some(String::new()));

        let req = test::TestRequest::get().uri("/api/tabs/").cookie(cookie).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
