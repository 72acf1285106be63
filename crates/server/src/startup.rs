use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_with_format;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::service::AuthConfig;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Map the `[auth]` section onto the service-level auth settings
pub fn auth_config(cfg: &configs::AuthConfig) -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(cfg.jwt_secret.clone()),
        password_algorithm: "argon2".into(),
        token_ttl_hours: cfg.token_ttl_hours,
    }
}

/// Create the configured staff account when it is missing
async fn bootstrap_admin(state: &auth::ServerState, cfg: &configs::AuthConfig) -> Result<(), StartupError> {
    let Some((username, password)) = cfg.bootstrap_admin() else {
        return Ok(());
    };
    match state.auth.bootstrap_admin(username, password).await {
        Ok(Some(identity)) => info!(account_id = identity.account.id, %username, "bootstrap admin created"),
        Ok(None) => info!(%username, "bootstrap admin already present"),
        Err(e) => return Err(StartupError::Bootstrap(e.to_string())),
    }
    Ok(())
}

/// Connect, migrate, bootstrap and assemble the router
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await.map_err(|e| StartupError::Any(e.into()))?;
    info!("migrations applied");

    let state = auth::ServerState::with_database(db, auth_config(&cfg.auth));
    bootstrap_admin(&state, &cfg.auth).await?;
    Ok(routes::build_router(build_cors(), state))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    init_logging_with_format(&cfg.server.log_format);

    let app = build_app(&cfg).await?;

    // Bind and serve
    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
