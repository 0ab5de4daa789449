//! Auth gate for protected scopes
//!
//! Lets the request through when HTTP auth is disabled or the session has
//! logged in; otherwise answers 403 without calling the handler. Must sit
//! inside [`SessionMiddleware`](super::SessionMiddleware).

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use fedsql_auth::{AuthManager, SessionId};
use futures_util::future::LocalBoxFuture;
use log::{debug, error};

use crate::models::{ErrorCode, ErrorResponse};

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(auth) = req.app_data::<web::Data<AuthManager>>().cloned() else {
                error!("AuthManager missing from app data, refusing {}", req.path());
                let response = HttpResponse::InternalServerError().json(ErrorResponse::new(
                    ErrorCode::InternalError,
                    "Authentication is not configured",
                ));
                return Ok(req.into_response(response).map_into_right_body());
            };

            let session = req.extensions().get::<SessionId>().cloned();
            if !auth.is_authorized(session.as_ref()) {
                debug!("Rejected unauthenticated request to {}", req.path());
                let response = HttpResponse::Forbidden().json(ErrorResponse::new(
                    ErrorCode::Unauthenticated,
                    "Authentication required",
                ));
                return Ok(req.into_response(response).map_into_right_body());
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
