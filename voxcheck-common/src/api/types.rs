//! Shared API response types
//!
//! Error bodies returned by every voxcheck HTTP service.

use serde::{Deserialize, Serialize};

// ========================================
// Error Response Types
// ========================================

/// Machine-readable code plus human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error type identifier (e.g. "DECODE_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Error response envelope
///
/// # Examples
///
/// ```
/// use voxcheck_common::api::types::ErrorResponse;
///
/// let body = ErrorResponse::new("UNSUPPORTED_FORMAT", "Only MP3 audio format is supported");
/// let json = serde_json::to_value(&body).unwrap();
///
/// assert_eq!(json["status"], "error");
/// assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    /// Create new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

// ========================================
// Tests
// ========================================
