use actix_web::{web, HttpResponse};
use ks_core::repositories::{CacheStore, UserDirectory};
use ks_shared::{ApiResult, ErrorCatalog};
use tracing::info;

use crate::dto::auth::{LogoutRequest, LogoutResponse};
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Releases the pair made of the bearer access token and the refresh token
/// in the body. Requires authentication via the Authorization header.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "code": 0,
///     "message": "OK",
///     "data": { "released": true }
/// }
/// ```
///
/// Releasing tokens that are already gone still succeeds.
pub async fn logout<U, C>(
    state: web::Data<AppState<U, C>>,
    catalog: web::Data<ErrorCatalog>,
    auth: AuthContext,
    request: web::Json<LogoutRequest>,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    C: CacheStore + 'static,
{
    let refresh_token = request.into_inner().refresh_token;

    match state
        .auth_service
        .logout(&auth.access_token, refresh_token.trim())
        .await
    {
        Ok(released) => {
            info!(username = %auth.username, released, "User logged out");
            HttpResponse::Ok().json(ApiResult::success(&catalog, LogoutResponse { released }))
        }
        Err(error) => handle_domain_error(&error, &catalog),
    }
}
