//! Router and HTTP fixtures

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;

use voxcheck_vd::api::ApiKeyAuth;
use voxcheck_vd::services::{AudioFetcher, Classifier, FeatureExtractor, Pipeline};
use voxcheck_vd::{build_router, AppState};

use super::audio_generator::WavDecoder;

pub const TEST_API_KEY: &str = "sk_test_123456789";

/// Pipeline reading WAV instead of MP3
pub fn wav_pipeline() -> Pipeline {
    Pipeline::new(Box::new(WavDecoder), FeatureExtractor::default(), Classifier::default())
}

/// Router with API-key auth, default limits and the given pipeline
pub fn test_router(pipeline: Pipeline) -> Router {
    let fetcher = AudioFetcher::new(Duration::from_secs(5), 20 * 1024 * 1024).unwrap();
    let auth = Arc::new(ApiKeyAuth::new("x-api-key", TEST_API_KEY).unwrap());
    let state = AppState::new(Arc::new(pipeline), fetcher, auth, 32 * 1024 * 1024);
    build_router(state)
}

/// POST /api/voice-detection with an optional API key
pub fn post_detection(body: &Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/voice-detection")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Status and parsed JSON body
pub async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Serve `bytes` at `/audio` (and 404 elsewhere) on an ephemeral port
pub async fn serve_bytes(bytes: Vec<u8>) -> SocketAddr {
    let app = Router::new().route(
        "/audio",
        get(move || {
            let bytes = bytes.clone();
            async move { bytes }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
