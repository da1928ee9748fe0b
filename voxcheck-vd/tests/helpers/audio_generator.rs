//! Audio Test Fixture Generator
//!
//! Synthesises test signals and packs them as WAV bytes in memory. The
//! service only decodes MP3, so tests that need a shaped signal swap in
//! `WavDecoder` through the `AudioDecoder` trait. `silent_mp3` covers the
//! real MP3 decoder without needing an encoder.

use std::io::Cursor;

use voxcheck_vd::types::{AudioBuffer, SampleSequence};
use voxcheck_vd::utils::{AudioDecoder, DecodeError};

pub const TEST_SAMPLE_RATE: u32 = 16_000;

/// Stable tone used for the synthetic-voice scenario
pub const SINE_FREQUENCY_HZ: f32 = 220.0;
pub const SINE_AMPLITUDE: f32 = 0.1;

/// Pure sine at `SINE_FREQUENCY_HZ`
///
/// Whole seconds of a 220 Hz tone are whole cycles, so the clip ends on a
/// zero crossing.
pub fn sine_wave(duration_seconds: u32, sample_rate: u32) -> Vec<f32> {
    let total = (duration_seconds * sample_rate) as usize;
    (0..total)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            SINE_AMPLITUDE * (2.0 * std::f32::consts::PI * SINE_FREQUENCY_HZ * t).sin()
        })
        .collect()
}

/// Deterministic noise alternating between loud white noise and quiet
/// low-passed noise every `segment` samples
///
/// High zero-crossing rate overall, with energy and brightness jumping at
/// every segment boundary.
pub fn alternating_noise(total: usize, segment: usize) -> Vec<f32> {
    let mut state: u32 = 0x9E37_79B9;
    let mut next = move || {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state as f32 / u32::MAX as f32) * 2.0 - 1.0
    };

    let white: Vec<f32> = (0..total).map(|_| 0.8 * next()).collect();

    const TAPS: usize = 16;
    (0..total)
        .map(|i| {
            if (i / segment) % 2 == 0 {
                white[i]
            } else {
                let start = i.saturating_sub(TAPS - 1);
                let window = &white[start..=i];
                window.iter().sum::<f32>() / TAPS as f32
            }
        })
        .collect()
}

/// Sample rate of the frames written by `silent_mp3`
pub const MP3_SAMPLE_RATE: u32 = 44_100;

/// Samples per MPEG-1 Layer III frame
pub const MP3_FRAME_SAMPLES: usize = 1152;

/// `frames` silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz)
///
/// Header then zeroed side info and main data: digital silence.
pub fn silent_mp3(frames: usize, stereo: bool) -> Vec<u8> {
    const FRAME_BYTES: usize = 417;
    let mode = if stereo { 0x00 } else { 0xC0 };

    let mut bytes = Vec::with_capacity(frames * FRAME_BYTES);
    for _ in 0..frames {
        let mut frame = vec![0u8; FRAME_BYTES];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, mode]);
        bytes.extend(frame);
    }
    bytes
}

/// 32-bit float mono WAV file contents
pub fn wav_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Decodes WAV bytes written by `wav_bytes`
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn name(&self) -> &'static str {
        "test-wav"
    }

    fn decode(&self, buffer: AudioBuffer) -> Result<SampleSequence, DecodeError> {
        let reader = hound::WavReader::new(Cursor::new(buffer.into_bytes()))
            .map_err(|e| DecodeError::UnrecognizedContainer(e.to_string()))?;
        let sample_rate = reader.spec().sample_rate;

        let samples = reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

        if samples.is_empty() {
            return Err(DecodeError::NoSamples);
        }
        Ok(SampleSequence::new(samples, sample_rate))
    }
}

/// Ignores the buffer and returns a fixed sequence
pub struct FixedDecoder(pub SampleSequence);

impl AudioDecoder for FixedDecoder {
    fn name(&self) -> &'static str {
        "test-fixed"
    }

    fn decode(&self, _buffer: AudioBuffer) -> Result<SampleSequence, DecodeError> {
        Ok(self.0.clone())
    }
}
