//! Request extractors for the tenant header and the cookie session.

use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use fedsql_auth::SessionId;
use fedsql_commons::{TenantId, DEFAULT_TENANT};
use fedsql_core::AppContext;

const DEFAULT_TENANT_HEADER: &str = "company-id";

/// Tenant of the request, from the configured tenant header.
///
/// A missing or blank header maps to the configured default tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(pub TenantId);

impl Tenant {
    pub fn into_inner(self) -> TenantId {
        self.0
    }
}

impl FromRequest for Tenant {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let app_context = req.app_data::<web::Data<Arc<AppContext>>>();
        let (header, fallback) = match app_context {
            Some(ctx) => {
                let tenancy = &ctx.config().tenancy;
                (tenancy.header.as_str(), tenancy.default_tenant.as_str())
            }
            None => (DEFAULT_TENANT_HEADER, DEFAULT_TENANT),
        };
        let value = req.headers().get(header).and_then(|v| v.to_str().ok());
        ready(Ok(Tenant(TenantId::from_header(value, fallback))))
    }
}

/// Session attached by [`SessionMiddleware`](crate::middleware::SessionMiddleware).
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionId>);

impl CurrentSession {
    pub fn as_ref(&self) -> Option<&SessionId> {
        self.0.as_ref()
    }
}

impl FromRequest for CurrentSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(CurrentSession(req.extensions().get::<SessionId>().cloned())))
    }
}
