//! Application state and factory
//!
//! [`AppFactory`] is built once at startup and cloned into every worker,
//! where [`AppFactory::create_app`] assembles the actix application with its
//! middleware stack and routes.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Compress, Condition},
    web, App, Error,
};
use ks_core::repositories::{CacheStore, UserDirectory};
use ks_core::services::auth::AuthService;
use ks_shared::config::{AppConfig, CorsConfig};
use ks_shared::ErrorCatalog;
use tracing_actix_web::TracingLogger;

use crate::handlers::error::{json_config, not_found};
use crate::middleware::{auth::JwtAuth, auth::TokenGate, cors::create_cors, trace::RequestTrace};
use crate::routes::auth::{login, logout, me, refresh, AppState};
use crate::routes::system::{health, pong};

/// Shared pieces every worker's application is built from
pub struct AppFactory<U, C>
where
    U: UserDirectory,
    C: CacheStore,
{
    state: web::Data<AppState<U, C>>,
    catalog: web::Data<ErrorCatalog>,
    gate: web::Data<dyn TokenGate>,
    trace: RequestTrace,
    cors: CorsConfig,
    enable_cors: bool,
    enable_gzip: bool,
}

impl<U, C> Clone for AppFactory<U, C>
where
    U: UserDirectory,
    C: CacheStore,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            catalog: self.catalog.clone(),
            gate: self.gate.clone(),
            trace: self.trace.clone(),
            cors: self.cors.clone(),
            enable_cors: self.enable_cors,
            enable_gzip: self.enable_gzip,
        }
    }
}

impl<U, C> AppFactory<U, C>
where
    U: UserDirectory + 'static,
    C: CacheStore + 'static,
{
    pub fn new(auth_service: Arc<AuthService<U, C>>, catalog: ErrorCatalog, config: &AppConfig) -> Self {
        let gate: Arc<dyn TokenGate> = Arc::clone(auth_service.tokens()) as Arc<dyn TokenGate>;

        let trace = RequestTrace::new()
            .with_allowed_prefixes(config.system.trace_allowed_prefixes.iter().cloned())
            .with_skipped_prefixes(config.system.trace_skipped_prefixes.iter().cloned())
            .with_trusted_proxies(&config.system.trusted_proxies);

        Self {
            state: web::Data::new(AppState::new(auth_service)),
            catalog: web::Data::new(catalog),
            gate: web::Data::from(gate),
            trace,
            cors: config.cors.clone(),
            enable_cors: config.system.enable_cors,
            enable_gzip: config.system.enable_gzip,
        }
    }

    /// Create and configure the application with all dependencies
    pub fn create_app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(self.catalog.clone())
            .app_data(self.gate.clone())
            .app_data(json_config())
            .configure(configure_routes::<U, C>)
            // Innermost first: compression, then CORS, request logging, trace id
            .wrap(Condition::new(self.enable_gzip, Compress::default()))
            .wrap(Condition::new(self.enable_cors, create_cors(&self.cors)))
            .wrap(TracingLogger::default())
            .wrap(self.trace.clone())
    }
}

/// Register every route
///
/// Expects `AppState<U, C>`, `ErrorCatalog` and `dyn TokenGate` as app data.
pub fn configure_routes<U, C>(cfg: &mut web::ServiceConfig)
where
    U: UserDirectory + 'static,
    C: CacheStore + 'static,
{
    cfg.route("/health", web::get().to(health::<U, C>))
        .route("/pong", web::get().to(pong))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/login", web::post().to(login::<U, C>))
                    .route("/refresh", web::post().to(refresh::<U, C>))
                    .route(
                        "/logout",
                        web::post().to(logout::<U, C>).wrap(JwtAuth::new()),
                    )
                    .route("/me", web::get().to(me).wrap(JwtAuth::new())),
            ),
        )
        .default_service(web::route().to(not_found));
}
