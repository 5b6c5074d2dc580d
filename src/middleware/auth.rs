use crate::{
    database::MongoDB,
    services::{token_service, user_service},
    utils::error::AppError,
};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use serde::Serialize;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Bearer value that grants reduced-functionality guest access without
/// verification.
pub const GUEST_TOKEN: &str = "guest";

pub const GUEST_ROLE: &str = "guest";

/// Request-scoped principal attached by `AuthMiddleware` and extracted by
/// handlers with `web::ReqData<AuthenticatedUser>`. The role comes from the
/// stored user record, not the token.
#[derive(Debug, Serialize, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn guest() -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            role: GUEST_ROLE.to_string(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.role == GUEST_ROLE
    }
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

/// Renders an auth failure with the service-wide error envelope instead of
/// propagating an `Err` up the middleware chain.
fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    let response = err.error_response().map_into_right_body();
    req.into_response(response)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
            let header = req
                .headers()
                .get(actix_web::http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            let token = match header {
                Some(header_str) if header_str.starts_with("Bearer ") => {
                    header_str[7..].to_string()
                }
                _ => {
                    return Ok(reject(
                        req,
                        AppError::Unauthorized("Token not provided".to_string()),
                    ));
                }
            };

            // Guest access: recognized role, no verification, no lookup
            if token == GUEST_TOKEN {
                req.extensions_mut().insert(AuthenticatedUser::guest());
                return service
                    .call(req)
                    .await
                    .map(|res| res.map_into_left_body());
            }

            let claims = match token_service::verify_access_token(&token) {
                Ok(claims) => claims,
                Err(_) => {
                    return Ok(reject(
                        req,
                        AppError::Unauthorized("Invalid token or server error".to_string()),
                    ));
                }
            };

            let db = match req.app_data::<web::Data<MongoDB>>().cloned() {
                Some(db) => db,
                None => {
                    return Ok(reject(
                        req,
                        AppError::Internal("Database handle missing".to_string()),
                    ));
                }
            };

            // The token may outlive the principal it references
            let user = match user_service::find_user_by_id(&db, &claims.id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    return Ok(reject(
                        req,
                        AppError::Unauthorized("Token not authorized".to_string()),
                    ));
                }
                Err(err) => return Ok(reject(req, err)),
            };

            req.extensions_mut().insert(AuthenticatedUser {
                id: user.id_hex(),
                email: user.email.clone(),
                role: user.role.clone(),
            });

            service
                .call(req)
                .await
                .map(|res| res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, HttpResponse};

    async fn whoami(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
        HttpResponse::Ok().json(user.into_inner())
    }

    macro_rules! protected_app {
        () => {
            test::init_service(App::new().service(
                web::resource("/whoami")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(whoami)),
            ))
            .await
        };
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let app = protected_app!();

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_malformed_header_is_unauthorized() {
        let app = protected_app!();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Token abc"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_guest_token_attaches_guest_identity() {
        let app = protected_app!();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer guest"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], "");
        assert_eq!(body["email"], "");
        assert_eq!(body["role"], "guest");
    }

    #[actix_web::test]
    async fn test_garbage_token_is_unauthorized() {
        std::env::set_var("JWT_SECRET", "test-access-secret");
        let app = protected_app!();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["message"], "Invalid token or server error");
        assert_eq!(body["status"], 401);
    }
}
