use crate::error::AppError;
use crate::utils::auth::{TokenService, TOKEN_COOKIE};
use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use tracing::warn;

/// Guards a resource: requires a valid `token` cookie and stores its `Claims`
/// in the request extensions. Any failure ends the request here.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

type Rejection<B> = LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B, BoxBody>>, Error>>;

fn reject<B: 'static>(req: ServiceRequest, err: AppError) -> Rejection<B> {
    let (req, _pl) = req.into_parts();
    let res = err.error_response();
    Box::pin(async move { Ok(ServiceResponse::new(req, res).map_into_right_body()) })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty());
        let Some(token) = token else {
            warn!(path = %req.path(), "Rejected request without token cookie");
            return reject(req, AppError::MissingToken);
        };

        let Some(tokens) = req.app_data::<web::Data<TokenService>>().cloned() else {
            return reject(
                req,
                AppError::Internal("token service not registered".to_string()),
            );
        };

        let claims = match tokens.verify(&token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(path = %req.path(), error = %err, "Rejected request with invalid token");
                return reject(req, err);
            }
        };

        req.extensions_mut().insert(claims);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
