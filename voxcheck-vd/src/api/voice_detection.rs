//! Voice detection endpoint
//!
//! POST /api/voice-detection: validate the request, obtain the audio, run the
//! pipeline on the blocking pool, shape the response.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{VoiceDetectionRequest, VoiceDetectionResponse};
use crate::services::AudioSource;
use crate::AppState;

/// POST /api/voice-detection
pub async fn detect_voice(
    State(state): State<AppState>,
    payload: Result<Json<VoiceDetectionRequest>, JsonRejection>,
) -> ApiResult<Json<VoiceDetectionResponse>> {
    let request_id = Uuid::new_v4();

    let Json(request) = payload.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;

    if !request.is_supported_format() {
        info!(%request_id, audio_format = %request.audio_format, "Unsupported audio format");
        return Err(ApiError::UnsupportedFormat);
    }

    let source = AudioSource::select(request.audio_base64, request.audio_url)?;
    info!(
        %request_id,
        language = %request.language,
        source = source.kind(),
        "Voice detection request"
    );

    let buffer = state.fetcher.load(source).await?;
    let audio_bytes = buffer.len();

    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::task::spawn_blocking(move || pipeline.run(buffer))
        .await
        .map_err(|e| ApiError::Internal(format!("Detection task failed: {}", e)))??;

    info!(
        %request_id,
        audio_bytes,
        classification = result.label.as_str(),
        confidence = result.confidence_score,
        "Voice detection complete"
    );

    Ok(Json(VoiceDetectionResponse::success(request.language, result)))
}

/// Build voice detection routes
pub fn voice_detection_routes() -> Router<AppState> {
    Router::new().route("/api/voice-detection", post(detect_voice))
}
