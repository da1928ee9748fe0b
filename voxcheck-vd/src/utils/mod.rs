//! Utility modules for voxcheck-vd

pub mod audio_decoder;

pub use audio_decoder::{decode_mp3, AudioDecoder, DecodeError, Mp3Decoder};
