//! Conversion of domain errors into HTTP responses
//!
//! Every failure is rendered as the `{code, message, data: null}` envelope,
//! with the message looked up in the [`ErrorCatalog`] registered as app data.

use actix_web::{error::InternalError, http::StatusCode, web, HttpRequest, HttpResponse};
use ks_core::errors::{AuthError, DomainError, TokenError};
use ks_shared::errors::{codes, ErrorCatalog};
use ks_shared::types::ApiResult;
use tracing::{debug, error};

/// HTTP status and catalog code of a domain error
pub fn classify(error: &DomainError) -> (StatusCode, u32) {
    match error {
        DomainError::Token(token_error) => match token_error {
            TokenError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, codes::TOKEN_SIGNING_FAILED),
            TokenError::InvalidSignature | TokenError::InvalidTokenFormat => {
                (StatusCode::UNAUTHORIZED, codes::TOKEN_INVALID)
            }
            TokenError::Expired => (StatusCode::UNAUTHORIZED, codes::TOKEN_EXPIRED),
            TokenError::TokenRevoked => (StatusCode::UNAUTHORIZED, codes::TOKEN_REVOKED),
            TokenError::InvalidRefreshToken => (StatusCode::UNAUTHORIZED, codes::REFRESH_TOKEN_INVALID),
            TokenError::MalformedAccessToken => (StatusCode::UNAUTHORIZED, codes::STALE_TOKEN_STATE),
            TokenError::RotationConflict => (StatusCode::CONFLICT, codes::ROTATION_CONFLICT),
            TokenError::CacheWrite(_) | TokenError::CacheDelete(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, codes::CACHE_UNAVAILABLE)
            }
        },
        DomainError::Auth(auth_error) => match auth_error {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, codes::MISSING_TOKEN),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, codes::INVALID_CREDENTIALS),
        },
        DomainError::Cache(_) => (StatusCode::SERVICE_UNAVAILABLE, codes::CACHE_UNAVAILABLE),
        DomainError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR),
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: &DomainError, catalog: &ErrorCatalog) -> HttpResponse {
    let (status, code) = classify(error);

    if status.is_server_error() {
        error!(code, error = %error, "Request failed");
    } else {
        debug!(code, error = %error, "Request rejected");
    }

    failure_response(status, code, catalog)
}

/// Envelope response for a bare catalog code
pub fn failure_response(status: StatusCode, code: u32, catalog: &ErrorCatalog) -> HttpResponse {
    HttpResponse::build(status).json(ApiResult::failure(catalog, code))
}

/// Like [`handle_domain_error`], for code that only has the request at hand
///
/// Falls back to the built-in catalog when none is registered.
pub fn handle_request_error(req: &HttpRequest, error: &DomainError) -> HttpResponse {
    match req.app_data::<web::Data<ErrorCatalog>>() {
        Some(catalog) => handle_domain_error(error, catalog),
        None => handle_domain_error(error, &ErrorCatalog::default()),
    }
}

/// Wrap a domain error as an `actix_web::Error` carrying its envelope
pub fn into_actix_error(req: &HttpRequest, error: DomainError) -> actix_web::Error {
    let response = handle_request_error(req, &error);
    InternalError::from_response(error, response).into()
}

/// JSON body configuration rendering malformed payloads as `BAD_REQUEST`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        debug!(error = %err, "Malformed JSON body");
        let response = match req.app_data::<web::Data<ErrorCatalog>>() {
            Some(catalog) => failure_response(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, catalog),
            None => failure_response(
                StatusCode::BAD_REQUEST,
                codes::BAD_REQUEST,
                &ErrorCatalog::default(),
            ),
        };
        InternalError::from_response(err, response).into()
    })
}

/// Default service for unknown routes
pub async fn not_found(catalog: web::Data<ErrorCatalog>) -> HttpResponse {
    failure_response(StatusCode::NOT_FOUND, codes::NOT_FOUND, &catalog)
}
