use actix_web::{web, HttpResponse};
use ks_shared::{ApiResult, ErrorCatalog};

use crate::dto::auth::ProfileResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/me
///
/// Describes the caller behind the bearer token.
pub async fn me(catalog: web::Data<ErrorCatalog>, auth: AuthContext) -> HttpResponse {
    let response = ProfileResponse {
        username: auth.username,
        token_id: auth.token_id,
        expires_at: auth.expires_at,
    };

    HttpResponse::Ok().json(ApiResult::success(&catalog, response))
}
