//! Core library for the media gateway service: configuration, the CDN
//! gateway, HTTP controllers, the bearer gate and the datastore
//! keep-alive.

pub mod config;
pub mod database;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod keepalive;
pub mod middleware;
pub mod models;

pub use config::AppConfig;
pub use database::{get_database_pool, DatabaseManager};
pub use error::{AppError, Result};
pub use gateway::MediaGateway;
pub use handlers::create_routes;
pub use keepalive::{KeepAlive, PingReport};
pub use middleware::auth::TokenVerifier;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub config: Arc<AppConfig>,
    pub gateway: Arc<MediaGateway>,
    pub db: DatabaseManager,
    pub keep_alive: Arc<KeepAlive>,
    pub token_verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: SqlitePool) -> Result<Self> {
        let gateway = MediaGateway::new(config.cdn.clone())
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let token_verifier = TokenVerifier::new(&config.auth.jwt_secret)?;
        let keep_alive = KeepAlive::new(pool.clone(), config.keep_alive.interval_seconds);

        Ok(Self {
            app_name: "Media Gateway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            db: DatabaseManager::new(pool),
            keep_alive: Arc::new(keep_alive),
            token_verifier: Arc::new(token_verifier),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes(state.clone()))
        .layer(middleware::cors::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{AppConfig, CdnConfig};

    pub const TEST_JWT_SECRET: &str = "0123456789abcdef0123456789abcdef";

    pub fn test_config(cdn_api_base: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
        config.cdn = CdnConfig {
            public_key: "public_test".to_string(),
            private_key: "private_test".to_string(),
            url_endpoint: "https://ik.imagekit.io/acme".to_string(),
            ..CdnConfig::default()
        };
        if let Some(base) = cdn_api_base {
            config.cdn.upload_api_base = base.to_string();
            config.cdn.management_api_base = base.to_string();
        }
        config
    }

    pub async fn test_state(cdn_api_base: Option<&str>) -> AppState {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        AppState::new(test_config(cdn_api_base), pool).unwrap()
    }
}
