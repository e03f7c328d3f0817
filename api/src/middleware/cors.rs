//! CORS middleware configuration for cross-origin requests.
//!
//! Origins come from the `cors` configuration section. An empty list (or a
//! `*` entry) accepts any origin, which suits development; production
//! deployments list their web origins explicitly.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use ks_shared::config::CorsConfig;
use tracing::info;

/// Creates a CORS middleware instance from configuration.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-request-id"),
        ])
        // Expose headers that clients might need to read
        .expose_headers(vec![
            header::HeaderName::from_static("x-request-id"),
            header::HeaderName::from_static("x-trace-id"),
        ])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        info!("Configuring CORS for any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in config.allowed_origins.iter().map(|s| s.trim()) {
            if !origin.is_empty() {
                info!("Adding allowed origin: {}", origin);
                cors = cors.allowed_origin(origin);
            }
        }
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn call_with_origin(config: CorsConfig, origin: &str) -> Option<String> {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, origin))
            .to_request();
        let resp = test::call_service(&app, req).await;

        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[actix_web::test]
    async fn test_any_origin_by_default() {
        let allowed = call_with_origin(CorsConfig::default(), "https://example.com").await;
        assert!(allowed.is_some());
    }

    #[actix_web::test]
    async fn test_listed_origin() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".to_string()],
            ..Default::default()
        };

        let allowed = call_with_origin(config, "https://app.example.com").await;
        assert_eq!(allowed.as_deref(), Some("https://app.example.com"));
    }
}
