//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! Each service wraps these with framework-specific middleware (Axum, etc.).

pub mod auth;
pub mod types;

pub use auth::{
    is_valid_key, key_digest, validate_api_key, ApiAuthError, KeyDigest, DEFAULT_API_KEY_HEADER,
};
pub use types::{ErrorDetail, ErrorResponse};
