//! Error types for voxcheck-vd
//!
//! Every failure a handler can return is an `ApiError`. The HTTP status and
//! wire code come from one table (`ErrorKind::mapping`), so adding a variant
//! means adding one row.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use voxcheck_common::api::ErrorResponse;

use crate::services::{ExtractionError, PipelineError, SourceError};
use crate::utils::DecodeError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong API key (401)
    #[error("Invalid API key")]
    Unauthorized,

    /// Body is not a valid request document (400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// `audioFormat` other than mp3 (400)
    #[error("Only MP3 audio format is supported")]
    UnsupportedFormat,

    /// Audio could not be obtained (400)
    #[error("Invalid audio input: {0}")]
    InvalidAudioInput(#[from] SourceError),

    /// Bytes are not decodable MP3 (400)
    #[error("Audio processing failed: {0}")]
    Decode(DecodeError),

    /// Decoded audio produced no usable features (422)
    #[error("Audio processing failed: {0}")]
    Extraction(ExtractionError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode(e) => ApiError::Decode(e),
            PipelineError::Extraction(e) => ApiError::Extraction(e),
        }
    }
}

/// Category of an `ApiError`, keyed into the status table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    InvalidRequest,
    UnsupportedFormat,
    InvalidAudioInput,
    DecodeError,
    ExtractionFailure,
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Unauthorized,
        ErrorKind::InvalidRequest,
        ErrorKind::UnsupportedFormat,
        ErrorKind::InvalidAudioInput,
        ErrorKind::DecodeError,
        ErrorKind::ExtractionFailure,
        ErrorKind::Internal,
    ];

    /// HTTP status and wire code
    pub fn mapping(self) -> (StatusCode, &'static str) {
        match self {
            ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::InvalidRequest => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ErrorKind::UnsupportedFormat => (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT"),
            ErrorKind::InvalidAudioInput => (StatusCode::BAD_REQUEST, "INVALID_AUDIO_INPUT"),
            ErrorKind::DecodeError => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            ErrorKind::ExtractionFailure => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILURE"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    pub fn status(self) -> StatusCode {
        self.mapping().0
    }

    pub fn code(self) -> &'static str {
        self.mapping().1
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApiError::UnsupportedFormat => ErrorKind::UnsupportedFormat,
            ApiError::InvalidAudioInput(_) => ErrorKind::InvalidAudioInput,
            ApiError::Decode(_) => ErrorKind::DecodeError,
            ApiError::Extraction(_) => ErrorKind::ExtractionFailure,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.kind().mapping();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::debug!(code, error = %self, "Request rejected");
        }

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
