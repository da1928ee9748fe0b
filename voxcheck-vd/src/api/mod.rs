//! HTTP API handlers for voxcheck-vd

pub mod auth_middleware;
pub mod health;
pub mod voice_detection;

pub use auth_middleware::{ApiKeyAuth, AuthLayer, AuthStrategy, NoAuth};
pub use health::health_routes;
pub use voice_detection::voice_detection_routes;
