//! API routes configuration

use actix_web::{error::InternalError, web, HttpResponse};
use fedsql_configs::ServerConfig;

use crate::handlers;
use crate::middleware::{AuthGate, SessionMiddleware};
use crate::models::{ErrorCode, ErrorResponse};

/// Configure the gateway routes under `server.api_prefix`.
///
/// Every route sees a session; everything but status, login/logout, the
/// util pings and `/config/vars` is behind the auth gate.
pub fn configure_routes(cfg: &mut web::ServiceConfig, config: &ServerConfig) {
    let json_config = web::JsonConfig::default()
        .limit(config.limits.max_request_body_bytes)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(
                ErrorCode::InvalidInput,
                format!("Invalid JSON payload: {}", err),
            ));
            InternalError::from_response(err, response).into()
        });

    cfg.service(
        web::scope(&config.server.api_prefix)
            .app_data(json_config)
            .wrap(SessionMiddleware)
            .route("/status", web::get().to(handlers::status_handler))
            .route("/login", web::post().to(handlers::login_handler))
            .route("/logout", web::post().to(handlers::logout_handler))
            .service(
                web::scope("/util")
                    .route("/ping", web::get().to(handlers::ping_handler))
                    .route("/ping_native", web::get().to(handlers::ping_handler)),
            )
            .service(
                web::scope("/config")
                    .route("/vars", web::get().to(handlers::vars_handler))
                    .service(
                        web::resource(["", "/"])
                            .wrap(AuthGate)
                            .route(web::get().to(handlers::get_config_handler))
                            .route(web::put().to(handlers::put_config_handler)),
                    ),
            )
            .service(
                web::scope("/sql")
                    .wrap(AuthGate)
                    .route("/query", web::post().to(handlers::query_handler)),
            )
            .service(
                web::scope("/tree")
                    .wrap(AuthGate)
                    .route("", web::get().to(handlers::tree_handler))
                    .route("/", web::get().to(handlers::tree_handler))
                    .route("/{db}", web::get().to(handlers::tree_tables_handler)),
            )
            .service(
                web::scope("/files")
                    .wrap(AuthGate)
                    .route("", web::get().to(handlers::list_files_handler))
                    .route("/", web::get().to(handlers::list_files_handler))
                    .service(
                        web::resource("/{name}")
                            .route(web::put().to(handlers::upload_file_handler))
                            .route(web::delete().to(handlers::delete_file_handler)),
                    ),
            )
            .service(
                web::scope("/projects")
                    .wrap(AuthGate)
                    .route("", web::get().to(handlers::list_projects_handler))
                    .route("/", web::get().to(handlers::list_projects_handler))
                    .route("/{project}/models", web::get().to(handlers::list_models_handler))
                    .service(
                        web::resource("/{project}/models/{name}")
                            .route(web::get().to(handlers::get_model_handler))
                            .route(web::delete().to(handlers::delete_model_handler)),
                    )
                    .route(
                        "/{project}/models/{name}/predict",
                        web::post().to(handlers::predict_handler),
                    ),
            )
            .service(
                web::scope("/tabs")
                    .wrap(AuthGate)
                    .service(
                        web::resource(["", "/"])
                            .route(web::get().to(handlers::get_tabs_handler))
                            .route(web::post().to(handlers::save_tabs_handler)),
                    ),
            ),
    );
}
