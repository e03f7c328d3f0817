use actix_web::{web, HttpResponse};
use ks_core::repositories::{CacheStore, UserDirectory};
use ks_shared::{ApiResult, ErrorCatalog};

use crate::dto::auth::{AuthResponse, LoginRequest};
use crate::handlers::error::handle_domain_error;

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// # Request Body
///
/// ```json
/// {
///     "username": "alice",
///     "password": "secret"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "code": 0,
///     "message": "OK",
///     "data": {
///         "access_token": "eyJ...",
///         "refresh_token": "eyJ...",
///         "token_type": "Bearer",
///         "expires_in": 1800
///     }
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Unknown user or wrong password (40104)
/// - 503 Service Unavailable: Token store unreachable
pub async fn login<U, C>(
    state: web::Data<AppState<U, C>>,
    catalog: web::Data<ErrorCatalog>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    C: CacheStore + 'static,
{
    let LoginRequest { username, password } = request.into_inner();

    match state.auth_service.login(username.trim(), &password).await {
        Ok(pair) => {
            let response = AuthResponse::bearer(
                pair.access_token,
                pair.refresh_token,
                state.auth_service.access_validity_minutes(),
            );
            HttpResponse::Ok().json(ApiResult::success(&catalog, response))
        }
        Err(error) => handle_domain_error(&error, &catalog),
    }
}
