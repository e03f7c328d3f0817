//! Keystone server entry point
//!
//! Loads configuration, installs logging, connects the token store and runs
//! the HTTP server until it receives a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::HttpServer;
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use ks_api::{init_logging, AppFactory};
use ks_core::repositories::{InMemoryUserDirectory, SharedCache};
use ks_core::services::{AuthService, TokenPairManager, TokenServiceConfig};
use ks_infra::build_cache_store;
use ks_shared::{AppConfig, ErrorCatalog};

/// Keystone: JWT access/refresh token-pair server
#[derive(Debug, Parser)]
#[command(name = "keystone", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short = 'f', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long)]
    verbose: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    let _logging = init_logging(&config.log, args.verbose).context("initializing logging")?;

    info!("Starting Keystone v{}", env!("CARGO_PKG_VERSION"));

    if config.jwt.is_using_default_secret() {
        warn!("JWT secrets are the built-in defaults; set jwt.access_secret and jwt.refresh_secret");
    }
    if config.auth.users.is_empty() {
        warn!("No accounts configured under auth.users; every login will be rejected");
    }

    let cache: SharedCache = build_cache_store(&config.cache)
        .await
        .context("connecting to the cache store")?;

    let tokens = Arc::new(TokenPairManager::new(cache, TokenServiceConfig::from(&config.jwt)));
    let users = InMemoryUserDirectory::from_config(&config.auth);
    let auth_service = Arc::new(AuthService::new(users, tokens));

    let catalog = ErrorCatalog::with_overrides(&config.message_overrides()?);
    let factory = AppFactory::new(auth_service, catalog, &config);

    let bind_address = config.system.server_address.clone();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || factory.create_app())
        .shutdown_timeout(config.system.shutdown_timeout_secs);
    if config.system.workers > 0 {
        server = server.workers(config.system.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("binding {}", bind_address))?
        .run()
        .await?;

    info!("Server stopped");
    Ok(())
}
