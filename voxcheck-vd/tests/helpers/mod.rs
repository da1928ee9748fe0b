//! Test Helper Utilities
//!
//! Shared utilities for testing voxcheck-vd

#![allow(dead_code, unused_imports)]

pub mod audio_generator;
pub mod test_app;

// Re-export commonly used items
pub use audio_generator::{
    alternating_noise, silent_mp3, sine_wave, wav_bytes, FixedDecoder, WavDecoder,
    MP3_FRAME_SAMPLES, MP3_SAMPLE_RATE, SINE_AMPLITUDE, SINE_FREQUENCY_HZ, TEST_SAMPLE_RATE,
};
pub use test_app::{
    json_body, post_detection, serve_bytes, test_router, wav_pipeline, TEST_API_KEY,
};
