//! Wire models for voxcheck-vd

pub mod voice_detection;

pub use voice_detection::{VoiceDetectionRequest, VoiceDetectionResponse, SUPPORTED_AUDIO_FORMAT};
