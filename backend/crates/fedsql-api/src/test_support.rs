//! Shared helpers for handler tests.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::web;
use fedsql_auth::{AuthManager, CookieConfig};

/// Build the routed app around an `Arc<AppContext>` and a `web::Data<AuthManager>`.
macro_rules! init_test_app {
    ($app_context:expr, $auth:expr) => {{
        let app_context: std::sync::Arc<fedsql_core::AppContext> = $app_context;
        let config = std::sync::Arc::clone(app_context.config());
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(app_context))
                .app_data($auth)
                .configure(|cfg| crate::routes::configure_routes(cfg, &config)),
        )
        .await
    }};
}

pub(crate) fn auth_manager() -> web::Data<AuthManager> {
    web::Data::new(AuthManager::new(
        CookieConfig::default(),
        chrono::Duration::hours(1),
        4,
    ))
}

pub(crate) fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == "fedsql_session")
        .map(|c| c.into_owned())
}
