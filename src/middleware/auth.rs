use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::config::Config;
use crate::models::SaveResponse;
use crate::services::session_service::{self, SESSION_COOKIE};
use crate::utils::AppError;

/// Requires a valid session (cookie or bearer token) and exposes its
/// `Claims` to handlers through `web::ReqData<Claims>`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
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

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<Config>>().cloned() else {
            log::error!("❌ Config missing from app data");
            let res = req
                .into_response(HttpResponse::InternalServerError().json(SaveResponse::failed(
                    "Server configuration error",
                )))
                .map_into_right_body();
            return Box::pin(async move { Ok(res) });
        };

        // Bearer header first; a bearer token that fails verification does
        // not hide a valid session cookie.
        let candidates = [
            req.headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(session_service::bearer_token)
                .map(str::to_string),
            req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()),
        ];

        let mut claims = Err(AppError::Unauthorized("No session".to_string()));
        for token in candidates.iter().flatten() {
            claims = session_service::verify_session(&config.jwt, token);
            if claims.is_ok() {
                break;
            }
        }

        match claims {
            Ok(claims) => {
                log::debug!("🔓 Session ok for {} on {}", claims.email(), req.path());
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(e) => {
                log::warn!("🚫 Unauthorized access attempt on {}: {}", req.path(), e);
                let res = req
                    .into_response(
                        HttpResponse::Unauthorized().json(SaveResponse::failed("Unauthorized")),
                    )
                    .map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
