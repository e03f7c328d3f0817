//! Liveness endpoints

use actix_web::{http::StatusCode, web, HttpResponse};
use ks_core::repositories::{CacheStore, UserDirectory};
use ks_shared::errors::codes;
use ks_shared::{ApiResult, ErrorCatalog};
use tracing::warn;

use crate::dto::system::HealthResponse;
use crate::routes::auth::AppState;

/// Handler for GET /health
///
/// Answers 503 with `status: degraded` when the token store is unreachable.
pub async fn health<U, C>(
    state: web::Data<AppState<U, C>>,
    catalog: web::Data<ErrorCatalog>,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    C: CacheStore + 'static,
{
    let cache_up = match state.auth_service.tokens().cache().health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check: cache store unreachable");
            false
        }
    };

    let response = HealthResponse::new(cache_up);
    if response.is_healthy() {
        HttpResponse::Ok().json(ApiResult::success(&catalog, response))
    } else {
        HttpResponse::build(StatusCode::SERVICE_UNAVAILABLE).json(ApiResult::new(
            codes::CACHE_UNAVAILABLE,
            catalog.message(codes::CACHE_UNAVAILABLE),
            Some(response),
        ))
    }
}

/// Handler for GET /pong
pub async fn pong() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("pong")
}
