//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the access token from the Authorization header,
//! hands it to the [`TokenGate`] registered as app data, and injects an
//! [`AuthContext`] into the request on success. Failures are answered with
//! the JSON error envelope and never reach the wrapped service.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use ks_core::{
    domain::entities::token::Claims,
    errors::{AuthError, DomainError, TokenError},
    repositories::CacheStore,
    services::token::TokenPairManager,
};
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::error;

use crate::handlers::error::into_actix_error;

/// Authenticated caller, available to handlers as an extractor
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub username: String,
    /// `jti` of the access token
    pub token_id: String,
    /// The raw access token, needed to release it on logout
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthContext {
    pub fn from_claims(claims: Claims, access_token: String) -> Self {
        let expires_at = claims.expires_at();
        Self {
            username: claims.username,
            token_id: claims.jti,
            access_token,
            expires_at,
        }
    }
}

/// Verifies bearer tokens on behalf of the middleware
///
/// Registered as `web::Data<dyn TokenGate>` so the middleware stays free of
/// the cache store's type.
#[async_trait]
pub trait TokenGate: Send + Sync {
    async fn authenticate(&self, access_token: &str) -> Result<Claims, TokenError>;
}

#[async_trait]
impl<C: CacheStore + 'static> TokenGate for TokenPairManager<C> {
    async fn authenticate(&self, access_token: &str) -> Result<Claims, TokenError> {
        TokenPairManager::authenticate(self, access_token).await
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match extract_token(&req) {
                Some(token) => token,
                None => {
                    return Err(into_actix_error(
                        req.request(),
                        AuthError::MissingToken.into(),
                    ));
                }
            };

            let gate = match req.app_data::<web::Data<dyn TokenGate>>() {
                Some(gate) => gate.clone(),
                None => {
                    error!("JwtAuth is mounted but no TokenGate is registered");
                    return Err(into_actix_error(
                        req.request(),
                        DomainError::internal("token gate not configured"),
                    ));
                }
            };

            let claims = match gate.authenticate(&token).await {
                Ok(claims) => claims,
                Err(e) => return Err(into_actix_error(req.request(), e.into())),
            };

            req.extensions_mut()
                .insert(AuthContext::from_claims(claims, token));

            service.call(req).await
        })
    }
}

/// Extracts the token from the Authorization header
///
/// A `Bearer ` prefix is stripped when present; a bare token is accepted.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| into_actix_error(req, AuthError::MissingToken.into()));

        ready(result)
    }
}
