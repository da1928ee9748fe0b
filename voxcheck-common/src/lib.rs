//! # voxcheck Common Library
//!
//! Shared code for the voxcheck services:
//! - Error type used by configuration and shared helpers
//! - TOML configuration loading and config file resolution
//! - API key validation (framework independent)
//! - Shared API error body types

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
