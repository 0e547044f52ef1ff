//! quizdeck-server: HTTP API.
//!
//! Exposes quiz authoring, quiz taking and account management as a JSON API
//! under `/api`, built on `axum`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use quizdeck_core::accounts::AccountService;
use quizdeck_core::service::QuizService;
use quizdeck_core::traits::Store;

pub use auth::JwtCredentials;
pub use config::{load_config, load_config_from, ServerConfig};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub quizzes: QuizService,
    pub accounts: AccountService,
    pub credentials: Arc<JwtCredentials>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Self {
        let credentials = Arc::new(JwtCredentials::new(
            &config.jwt_secret,
            config.jwt_expires_secs,
        ));
        let accounts = AccountService::new(store.clone(), credentials.clone())
            .with_admin_registration(config.allow_admin_registration);
        Self {
            quizzes: QuizService::new(store),
            accounts,
            credentials,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("ignoring invalid CORS origin: {o}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Build the full application router.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    routes::api_router()
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Open the configured store and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let store = quizdeck_store::open_store(&config.database_url).await?;
    serve_with_store(config, store).await
}

/// Serve with an already opened store until Ctrl-C.
pub async fn serve_with_store(config: ServerConfig, store: Arc<dyn Store>) -> Result<()> {
    if config.uses_default_secret() {
        tracing::warn!("using the built-in JWT secret; set JWT_SECRET_KEY in production");
    }

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("quizdeck API listening on http://{}", listener.local_addr()?);

    let router = app(AppState::new(store, &config), &config);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
