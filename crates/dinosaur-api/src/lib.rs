//! Dinosaur API
//!
//! HTTP service exposing create, read and delete operations over dinosaur
//! records. Requests flow from the axum server through the route table
//! (`routing`) to a handler (`handlers`), which decodes input (`codec`),
//! makes one call on the persistence port and encodes the result.

#![warn(missing_docs)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod message;
pub mod routing;

use axum::http::{HeaderValue, Method};
use axum::Router as AxumRouter;
use config::ApiConfig;
use dinosaur_store::{SqliteStore, StoreError};
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Datastore could not be opened
    #[error("Failed to open datastore: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more than
/// once is harmless; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// CORS layer for the configured origins, `None` when CORS is disabled
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any),
    )
}

/// Wrap the dispatch router with request tracing, timeout and CORS
pub fn build_app<S>(state: AppState<S>, config: &ApiConfig) -> AxumRouter
where
    S: dinosaur_domain::DinosaurStore + Send + 'static,
    S::Error: std::fmt::Display,
{
    let mut app = create_router(state).layer(TimeoutLayer::new(config.request_timeout()));

    if let Some(cors) = cors_layer(&config.cors_origins) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// Start the API HTTP server
///
/// Opens the datastore, builds the application state and serves until
/// Ctrl+C or SIGTERM.
pub async fn start_server(config: ApiConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Dinosaur API");
    info!("Bind address: {}", config.bind_addr());
    info!("Request timeout: {} seconds", config.request_timeout_secs);

    let store = SqliteStore::open(&config.database_url)?;
    let state = AppState::new(store).with_max_body_bytes(config.max_body_bytes);
    let app = build_app(state, &config);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Dinosaur API listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Dinosaur API stopped");
    Ok(())
}

/// Resolve when the process is asked to stop
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use dinosaur_domain::{Dinosaur, DinosaurId, DinosaurStore, NewDinosaur};
    use std::time::Duration;
    use tower::ServiceExt; // for oneshot

    /// Store whose every call outlives a one-second request timeout
    struct SlowStore;

    impl SlowStore {
        fn stall() {
            std::thread::sleep(Duration::from_millis(2000));
        }
    }

    impl DinosaurStore for SlowStore {
        type Error = String;

        fn list_dinosaurs(&self) -> Result<Vec<Dinosaur>, Self::Error> {
            Self::stall();
            Ok(Vec::new())
        }

        fn get_dinosaur(&self, _id: DinosaurId) -> Result<Option<Dinosaur>, Self::Error> {
            Self::stall();
            Ok(None)
        }

        fn create_dinosaur(&mut self, _dinosaur: NewDinosaur) -> Result<Dinosaur, Self::Error> {
            Self::stall();
            Err("not stored".to_string())
        }

        fn delete_dinosaur(&mut self, _id: DinosaurId) -> Result<Option<Dinosaur>, Self::Error> {
            Self::stall();
            Ok(None)
        }

        fn count_dinosaurs(&self) -> Result<usize, Self::Error> {
            Self::stall();
            Ok(0)
        }
    }

    #[test]
    fn test_api_config() {
        let config = ApiConfig::default_test_config();
        assert_eq!(config.bind_port, 8000);
        assert_eq!(config.database_url, "sqlite://:memory:");
    }

    #[test]
    fn test_cors_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_some());
    }

    #[tokio::test]
    async fn test_build_app_applies_cors() {
        let mut config = ApiConfig::default_test_config();
        config.cors_origins = vec!["http://localhost:5173".to_string()];

        let store = SqliteStore::open(&config.database_url).unwrap();
        let app = build_app(AppState::new(store), &config);

        let request = Request::builder()
            .uri("/dinosaur")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_build_app_times_out_slow_requests() {
        let mut config = ApiConfig::default_test_config();
        config.request_timeout_secs = 1;

        let app = build_app(AppState::new(SlowStore), &config);

        let request = Request::builder()
            .uri("/dinosaur")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_start_server_rejects_bad_database_url() {
        let mut config = ApiConfig::default_test_config();
        config.database_url = "sqlite://".to_string();

        let result = start_server(config).await;
        assert!(matches!(result, Err(ServerError::Store(_))));
    }
}
