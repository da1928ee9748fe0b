//! Voice detection request/response bodies
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::types::{ClassificationResult, Label};

/// Only accepted value of `audioFormat` (case-insensitive)
pub const SUPPORTED_AUDIO_FORMAT: &str = "mp3";

/// POST /api/voice-detection body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDetectionRequest {
    /// Echoed back unchanged; never interpreted
    pub language: String,
    pub audio_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl VoiceDetectionRequest {
    pub fn is_supported_format(&self) -> bool {
        self.audio_format.eq_ignore_ascii_case(SUPPORTED_AUDIO_FORMAT)
    }
}

/// Successful detection response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDetectionResponse {
    /// Always "success"
    pub status: String,
    pub language: String,
    pub classification: Label,
    pub confidence_score: f64,
    pub explanation: String,
}

impl VoiceDetectionResponse {
    pub fn success(language: String, result: ClassificationResult) -> Self {
        Self {
            status: "success".to_string(),
            language,
            classification: result.label,
            confidence_score: result.confidence_score,
            explanation: result.explanation,
        }
    }
}
