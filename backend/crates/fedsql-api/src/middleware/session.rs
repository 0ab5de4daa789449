//! Session middleware
//!
//! Resolves the session cookie to a [`SessionId`], creating a session on
//! first contact, and stores it in the request extensions. New sessions get
//! a `Set-Cookie` unless the handler already set the session cookie itself
//! (login and logout do).

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use fedsql_auth::cookie::create_session_cookie;
use fedsql_auth::AuthManager;
use futures_util::future::LocalBoxFuture;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let auth = match req.app_data::<web::Data<AuthManager>>() {
                Some(auth) => auth.clone(),
                None => return service.call(req).await,
            };

            let cookie_name = auth.cookie_config().name.clone();
            let token = req.cookie(&cookie_name).map(|c| c.value().to_string());
            let (session, is_new) = auth.open_session(token.as_deref());
            if is_new {
                debug!("Opened session {} for {}", session, req.path());
            }
            req.extensions_mut().insert(session.clone());

            let mut res = service.call(req).await?;

            if is_new {
                let already_set = res.response().cookies().any(|c| c.name() == cookie_name);
                if !already_set {
                    let cookie = create_session_cookie(&session, auth.cookie_config());
                    if let Err(e) = res.response_mut().add_cookie(&cookie) {
                        warn!("Failed to set session cookie: {}", e);
                    }
                }
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, HttpResponse};
    use fedsql_auth::CookieConfig;

    fn auth_manager() -> web::Data<AuthManager> {
        web::Data::new(AuthManager::new(
            CookieConfig::default(),
            chrono::Duration::hours(1),
            4,
        ))
    }

    #[actix_web::test]
    async fn test_first_contact_sets_cookie_once() {
        let app = test::init_service(
            App::new()
                .app_data(auth_manager())
                .wrap(SessionMiddleware)
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "fedsql_session")
            .expect("session cookie")
            .into_owned();

        let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.response().cookies().count(), 0);
    }

    #[actix_web::test]
    async fn test_unknown_token_gets_fresh_session() {
        let app = test::init_service(
            App::new()
                .app_data(auth_manager())
                .wrap(SessionMiddleware)
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let stale = actix_web::cookie::Cookie::new("fedsql_session", "not-a-session");
        let req = test::TestRequest::get().uri("/").cookie(stale).to_request();
        let res = test::call_service(&app, req).await;
        let cookie = res.response().cookies().next().expect("replacement cookie");
        assert_ne!(cookie.value(), "not-a-session");
    }
}
