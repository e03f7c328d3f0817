use actix_web::{web, HttpResponse};
use ks_core::repositories::{CacheStore, UserDirectory};
use ks_shared::{ApiResult, ErrorCatalog};

use crate::dto::auth::{AuthResponse, RefreshTokenRequest};
use crate::handlers::error::handle_domain_error;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Mints a new access token for the pair and rebinds the refresh token to
/// it. The refresh token itself is returned unchanged.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Unknown, released or expired refresh token (40103)
/// - 401 Unauthorized: The pair's state is unusable (40107)
/// - 409 Conflict: Another request rotated the same refresh token first
/// - 503 Service Unavailable: Token store unreachable
pub async fn refresh<U, C>(
    state: web::Data<AppState<U, C>>,
    catalog: web::Data<ErrorCatalog>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    C: CacheStore + 'static,
{
    let refresh_token = request.into_inner().refresh_token;

    match state.auth_service.refresh(refresh_token.trim()).await {
        Ok(access_token) => {
            let response = AuthResponse::bearer(
                access_token,
                refresh_token.trim().to_string(),
                state.auth_service.access_validity_minutes(),
            );
            HttpResponse::Ok().json(ApiResult::success(&catalog, response))
        }
        Err(error) => handle_domain_error(&error, &catalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_request_structure() {
        let request: RefreshTokenRequest =
            serde_json::from_str(r#"{"refresh_token":"test_token_123"}"#).unwrap();

        assert_eq!(request.refresh_token, "test_token_123");
    }
}
