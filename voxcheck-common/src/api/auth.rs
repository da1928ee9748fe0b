//! API key authentication
//!
//! # Architecture
//!
//! - Clients send a static shared secret in a request header (`x-api-key`
//!   unless configured otherwise)
//! - The service stores only the SHA-256 digest of the configured key
//! - Presented keys are hashed and compared digest-to-digest in constant
//!   time, so comparison time does not depend on key contents or length
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions.
//! No HTTP framework dependencies (Axum, etc.) - those are in service-specific code.

use sha2::{Digest, Sha256};

/// Default header carrying the API key
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// SHA-256 digest of an API key
pub type KeyDigest = [u8; 32];

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// Header absent or empty
    MissingKey,

    /// Header present but does not match the configured key
    InvalidKey,
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingKey => write!(f, "Missing API key"),
            ApiAuthError::InvalidKey => write!(f, "Invalid API key"),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Key Handling
// ========================================

/// Validate API key shape (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Calculate the digest stored in place of the plaintext key
///
/// # Examples
///
/// ```
/// use voxcheck_common::api::auth::key_digest;
///
/// let digest = key_digest("sk_test_123456789");
/// assert_eq!(digest.len(), 32);
/// assert_eq!(digest, key_digest("sk_test_123456789"));
/// ```
pub fn key_digest(key: &str) -> KeyDigest {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

/// Validate a presented key against the configured digest
///
/// # Examples
///
/// ```
/// use voxcheck_common::api::auth::{key_digest, validate_api_key, ApiAuthError};
///
/// let expected = key_digest("secret");
///
/// assert!(validate_api_key(Some("secret"), &expected).is_ok());
/// assert_eq!(validate_api_key(Some("wrong"), &expected), Err(ApiAuthError::InvalidKey));
/// assert_eq!(validate_api_key(None, &expected), Err(ApiAuthError::MissingKey));
/// ```
pub fn validate_api_key(presented: Option<&str>, expected: &KeyDigest) -> Result<(), ApiAuthError> {
    let presented = match presented {
        Some(key) if !key.is_empty() => key,
        _ => return Err(ApiAuthError::MissingKey),
    };

    if digests_equal(&key_digest(presented), expected) {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidKey)
    }
}

/// Constant-time digest comparison
fn digests_equal(a: &KeyDigest, b: &KeyDigest) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ========================================
// Tests
// ========================================
