//! diary-server library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod oracles;
pub mod prompts;
pub mod service;
pub mod session;
pub mod storage;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::DiaryService;
use crate::session::SessionRegistry;
use crate::storage::DiaryStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Diary workflow orchestrator over the oracle clients
    pub service: Arc<DiaryService>,
    /// Client token → conversation session
    pub registry: Arc<SessionRegistry>,
    /// Saved diary persistence
    pub store: Arc<DiaryStore>,
    /// HTTP client for fetching images named by URL; callers build it
    /// with a request timeout so a stalled remote cannot pin a handler
    pub http_client: reqwest::Client,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        service: Arc<DiaryService>,
        registry: Arc<SessionRegistry>,
        store: Arc<DiaryStore>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            service,
            registry,
            store,
            http_client,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::diary_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(api::diary::MAX_IMAGE_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
