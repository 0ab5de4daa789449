//! Server-wide middleware configuration helpers.
//!
//! Keeps the Actix application setup focused by providing reusable
//! constructors for the CORS and request logging layers. Session and auth
//! middleware live with the API routes.

use actix_cors::Cors;
use actix_web::http::{header::HeaderName, Method};
use actix_web::middleware;
use fedsql_configs::ServerConfig;
use log::debug;

/// Build CORS middleware from server configuration using actix-cors.
///
/// See: https://docs.rs/actix-cors/latest/actix_cors/struct.Cors.html
pub fn build_cors_from_config(config: &ServerConfig) -> Cors {
    let cors_config = &config.security.cors;

    let mut cors = Cors::default();

    if cors_config.allowed_origins.is_empty() || cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
        debug!("CORS: Allowing any origin");
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        debug!("CORS: Allowed origins: {:?}", cors_config.allowed_origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    // The tenant header must always pass preflight
    if cors_config.allowed_headers.iter().any(|h| h == "*") {
        cors = cors.allow_any_header();
    } else {
        let mut headers: Vec<HeaderName> = cors_config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if let Ok(tenant_header) = config.tenancy.header.parse::<HeaderName>() {
            if !headers.contains(&tenant_header) {
                headers.push(tenant_header);
            }
        }
        cors = cors.allowed_headers(headers);
    }

    if !cors_config.expose_headers.is_empty() {
        let expose_headers: Vec<HeaderName> = cors_config
            .expose_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        cors = cors.expose_headers(expose_headers);
    }

    // Session cookies need credentialed requests
    if cors_config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors.max_age(cors_config.max_age as usize)
}

/// Build the request logger middleware. Health checks are not logged.
pub fn request_logger(api_prefix: &str) -> middleware::Logger {
    middleware::Logger::new("%a \"%r\" %s %b %Dms")
        .exclude(format!("{}/util/ping", api_prefix))
        .exclude(format!("{}/util/ping_native", api_prefix))
}
