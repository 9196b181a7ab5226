//! Liftlog Server
//!
//! A workout log server that keeps each account's history in a hosted JSON
//! document store and delegates sign-in to an identity provider.
//!
//! # Configuration
//!
//! Environment variables:
//! - `LIFTLOG_CONFIG`: Path to config file (default: ~/.config/liftlog/config.yaml)
//! - `LIFTLOG_PORT`: Port to listen on (default: 8080)
//! - `LIFTLOG_PUBLIC_URL`: Externally reachable base URL (default: http://localhost:8080)
//! - `LIFTLOG_STORE_URL`: Document store base URL (default: https://api.jsonbin.io/v3)
//! - `LIFTLOG_STORE_BIN`: Document (bin) id holding the log
//! - `LIFTLOG_STORE_KEY`: Store credential, sent as X-Master-Key
//! - `LIFTLOG_AUTH_URL`: Identity provider base URL; sign-in is disabled without it
//! - `LIFTLOG_CORS_ORIGIN`: Browser origin allowed to call the API
//! - `LIFTLOG_SESSION_EXPIRY_MINUTES`: Session lifetime (default: 43200)
//! - `LIFTLOG_SECURE_COOKIES`: Mark session cookies Secure ("1" or "true")
//!
//! # Config File Format
//!
//! ```yaml
//! port: 8080
//! public_url: "https://log.example.com"
//! store_bin: "65f0c2a1e41b4d34e4a0b9c7"
//! store_key: "$2a$10$your-master-key"
//! auth_url: "https://auth.example.com"
//! cors_origin: "http://localhost:5173"
//! ```
//!
//! # Endpoints
//!
//! - `GET /health`: Health check (no auth required)
//! - `GET /api/me`: Signed-in account (401 when anonymous)
//! - `GET /api/exercises?week=N`: List entries, optionally one week
//! - `POST /api/exercises`: Append an entry (form-encoded)
//! - `DELETE /api/exercises/{id}`: Remove an entry
//! - `GET /api/exercises/weeks`: Distinct week numbers in the history
//! - `GET /auth/login`: Redirect to the identity provider
//! - `GET /auth/callback`: Provider return leg, sets the session cookie
//! - `POST /auth/logout`: Destroy the session

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liftlog::auth::{IdentityClient, SessionStore};
use liftlog::config::Config;
use liftlog::exercises::ExerciseLog;
use liftlog::revalidate::Revalidator;
use liftlog::server::{router, AppState};
use liftlog::store::RemoteStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liftlog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("LIFTLOG_CONFIG").map(PathBuf::from).ok();
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    config.warn_if_incomplete();

    tracing::info!("Document store: {}", config.store_url);

    // Wire up the services
    let store = Arc::new(RemoteStore::new(
        &config.store_url,
        config.store_bin.clone(),
        config.store_key.clone(),
    ));

    let revalidator = Revalidator::new();
    let mut stale = revalidator.subscribe();
    tokio::spawn(async move {
        loop {
            match stale.recv().await {
                Ok(path) => tracing::debug!("view {} marked stale", path),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let log = Arc::new(ExerciseLog::new(store, revalidator));
    let sessions = Arc::new(SessionStore::new(config.session_expiry_minutes));
    let identity = config
        .auth_url
        .as_deref()
        .map(|url| Arc::new(IdentityClient::new(url)));

    // Drop expired sessions once an hour
    let cleanup_sessions = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let removed = cleanup_sessions.cleanup_expired();
            if removed > 0 {
                tracing::info!("Removed {} expired session(s)", removed);
            }
        }
    });

    // Build router
    let state = AppState {
        log,
        sessions,
        identity,
        public_url: config.public_url.clone(),
        secure_cookies: config.secure_cookies,
    };
    let app = router(state, config.cors_origin.as_deref());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
