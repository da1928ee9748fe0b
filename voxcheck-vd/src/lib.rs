//! voxcheck-vd library interface
//!
//! Synthetic voice detection: decode MP3, extract acoustic statistics,
//! classify with threshold votes, served over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod types;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::api::{ApiKeyAuth, AuthLayer, AuthStrategy, NoAuth};
use crate::config::{AuthSettings, ServiceConfig};
use crate::services::{AudioFetcher, Pipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Decode → extract → classify, shared immutably
    pub pipeline: Arc<Pipeline>,
    /// Resolves base64 / URL audio sources
    pub fetcher: AudioFetcher,
    /// Request authentication for the detection routes
    pub auth: Arc<dyn AuthStrategy>,
    /// Request body ceiling in bytes
    pub max_request_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<Pipeline>,
        fetcher: AudioFetcher,
        auth: Arc<dyn AuthStrategy>,
        max_request_bytes: usize,
    ) -> Self {
        Self {
            pipeline,
            fetcher,
            auth,
            max_request_bytes,
            startup_time: Utc::now(),
        }
    }

    /// Build state from resolved configuration
    pub fn from_config(config: &ServiceConfig) -> voxcheck_common::Result<Self> {
        let auth: Arc<dyn AuthStrategy> = match &config.auth {
            AuthSettings::Disabled => Arc::new(NoAuth),
            AuthSettings::ApiKey { header, key } => Arc::new(ApiKeyAuth::new(header, key)?),
        };

        let fetcher = AudioFetcher::new(config.fetch_timeout, config.max_audio_bytes)
            .map_err(|e| voxcheck_common::Error::Internal(format!("HTTP client setup failed: {}", e)))?;

        let pipeline = Arc::new(Pipeline::with_classifier(config.classifier.clone()));

        Ok(Self::new(pipeline, fetcher, auth, config.max_request_bytes))
    }
}

/// Build application router
///
/// Detection routes sit behind the auth layer; `/health` does not.
pub fn build_router(state: AppState) -> Router {
    let detection = api::voice_detection_routes()
        .route_layer(AuthLayer::new(Arc::clone(&state.auth)))
        .layer(DefaultBodyLimit::max(state.max_request_bytes));

    Router::new()
        .merge(detection)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
