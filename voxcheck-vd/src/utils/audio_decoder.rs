//! Audio Decoding
//!
//! **Purpose:** Decode compressed audio bytes to mono f32 PCM samples
//!
//! Uses symphonia, reading straight from memory (no intermediate files).
//! Only MP3 streams are accepted; any other container or codec is a
//! `DecodeError`.

use std::io::Cursor;
use symphonia::core::audio::{AudioBuffer as PcmBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CodecType, DecoderOptions, CODEC_TYPE_MP3, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use thiserror::Error;

use crate::types::{AudioBuffer, SampleSequence};

/// Decoder failures
///
/// Every variant means "these bytes are not usable MP3 audio"; callers treat
/// them as client input errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unrecognized audio container: {0}")]
    UnrecognizedContainer(String),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Unsupported codec: expected mp3, found {0}")]
    UnsupportedCodec(String),

    #[error("Sample rate unknown")]
    UnknownSampleRate,

    #[error("Error reading packet: {0}")]
    Read(String),

    #[error("Corrupt audio stream: {0}")]
    Corrupt(String),

    #[error("Decoding produced no samples")]
    NoSamples,
}

/// Turns an `AudioBuffer` into a `SampleSequence`
///
/// The pipeline depends on this trait rather than on symphonia directly.
pub trait AudioDecoder: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Decode the whole buffer to mono samples at the native sample rate
    fn decode(&self, buffer: AudioBuffer) -> Result<SampleSequence, DecodeError>;
}

/// Symphonia-backed MP3 decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp3Decoder;

impl Mp3Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for Mp3Decoder {
    fn name(&self) -> &'static str {
        "symphonia-mp3"
    }

    fn decode(&self, buffer: AudioBuffer) -> Result<SampleSequence, DecodeError> {
        decode_mp3(buffer)
    }
}

/// Decode MP3 bytes to mono f32 PCM samples
///
/// **Algorithm:**
/// 1. Probe the in-memory stream using symphonia (hinted as mp3)
/// 2. Find the first audio track and require the MP3 codec
/// 3. Decode all packets; corrupt frames are skipped, other errors abort
/// 4. Convert multi-channel to mono (average channels)
/// 5. Return mono f32 samples + native sample rate
///
/// # Errors
/// * Unrecognized container or no audio track
/// * Non-MP3 codec
/// * Unreadable packet stream
/// * Zero decoded samples
pub fn decode_mp3(buffer: AudioBuffer) -> Result<SampleSequence, DecodeError> {
    if buffer.is_empty() {
        return Err(DecodeError::UnrecognizedContainer("empty buffer".to_string()));
    }

    let byte_len = buffer.len();
    tracing::debug!(bytes = byte_len, "Decoding audio buffer");

    let mss = MediaSourceStream::new(Box::new(Cursor::new(buffer.into_bytes())), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    // Probe the media source
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::UnrecognizedContainer(e.to_string()))?;

    let mut format = probed.format;

    // Find the default audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    if track.codec_params.codec != CODEC_TYPE_MP3 {
        return Err(DecodeError::UnsupportedCodec(codec_name(track.codec_params.codec)));
    }

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    tracing::debug!(
        sample_rate = ?sample_rate,
        channels = ?track.codec_params.channels.map(|c| c.count()),
        "Audio stream info"
    );

    // Create decoder
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedCodec(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // End of stream
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Read(e.to_string())),
        };

        // Skip packets from other tracks
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_rate.is_none() {
                    sample_rate = Some(decoded.spec().rate);
                }
                mix_to_mono(&decoded, &mut samples);
            }
            Err(SymphoniaError::DecodeError(reason)) => {
                // Corrupt frame: drop it and keep going
                skipped_packets += 1;
                tracing::warn!(reason, "Skipping undecodable mp3 frame");
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        }
    }

    if samples.is_empty() {
        return Err(DecodeError::NoSamples);
    }

    let sample_rate = match sample_rate {
        Some(rate) if rate > 0 => rate,
        _ => return Err(DecodeError::UnknownSampleRate),
    };

    let sequence = SampleSequence::new(samples, sample_rate);

    tracing::debug!(
        total_samples = sequence.samples.len(),
        skipped_packets,
        duration_seconds = format!("{:.2}", sequence.duration_seconds()),
        "Audio decoding complete"
    );

    Ok(sequence)
}

/// Human-readable codec name for error messages
fn codec_name(codec: CodecType) -> String {
    symphonia::default::get_codecs()
        .get_codec(codec)
        .map(|descriptor| descriptor.short_name.to_string())
        .unwrap_or_else(|| format!("{:?}", codec))
}

/// Append one decoded buffer to `out` as mono f32 samples
fn mix_to_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => average_channels(&**buf, out),
        AudioBufferRef::U16(buf) => average_channels(&**buf, out),
        AudioBufferRef::U24(buf) => average_channels(&**buf, out),
        AudioBufferRef::U32(buf) => average_channels(&**buf, out),
        AudioBufferRef::S8(buf) => average_channels(&**buf, out),
        AudioBufferRef::S16(buf) => average_channels(&**buf, out),
        AudioBufferRef::S24(buf) => average_channels(&**buf, out),
        AudioBufferRef::S32(buf) => average_channels(&**buf, out),
        AudioBufferRef::F32(buf) => average_channels(&**buf, out),
        AudioBufferRef::F64(buf) => average_channels(&**buf, out),
    }
}

/// Average all channels of each frame into a single f32 sample
fn average_channels<S>(buf: &PcmBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    if num_channels == 0 {
        return;
    }

    let num_frames = buf.frames();
    out.reserve(num_frames);

    for frame_idx in 0..num_frames {
        let mut sum = 0.0f32;
        for ch in 0..num_channels {
            sum += f32::from_sample(buf.chan(ch)[frame_idx]);
        }
        out.push(sum / num_channels as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::{Channels, SignalSpec};

    /// Samples per MPEG-1 Layer III frame
    const MP3_FRAME_SAMPLES: usize = 1152;

    /// `frames` silent MPEG-1 Layer III frames, 128 kbps at 44.1 kHz
    ///
    /// Each frame is a bare header followed by zeroed side info and main
    /// data, which decodes to digital silence.
    fn silent_mp3(frames: usize, stereo: bool) -> Vec<u8> {
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

    #[test]
    fn test_mono_mp3_decodes_at_native_rate() {
        let sequence = decode_mp3(AudioBuffer::new(silent_mp3(40, false))).unwrap();
        assert_eq!(sequence.sample_rate, 44100);
        assert_eq!(sequence.samples.len(), 40 * MP3_FRAME_SAMPLES);
        assert!(sequence.samples.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_stereo_mp3_is_mixed_to_mono() {
        // Mono output: one sample per frame position, not one per channel
        let sequence = Mp3Decoder::new()
            .decode(AudioBuffer::new(silent_mp3(40, true)))
            .unwrap();
        assert_eq!(sequence.sample_rate, 44100);
        assert_eq!(sequence.samples.len(), 40 * MP3_FRAME_SAMPLES);
        assert!(sequence.samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_id3v2_tag_is_skipped() {
        // "ID3" v2.3, no flags, syncsafe size 10, then 10 bytes of padding
        let mut bytes = vec![b'I', b'D', b'3', 3, 0, 0, 0, 0, 0, 10];
        bytes.extend([0u8; 10]);
        bytes.extend(silent_mp3(20, false));

        let sequence = decode_mp3(AudioBuffer::new(bytes)).unwrap();
        assert_eq!(sequence.sample_rate, 44100);
        assert_eq!(sequence.samples.len(), 20 * MP3_FRAME_SAMPLES);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let result = decode_mp3(AudioBuffer::new(Vec::new()));
        assert!(matches!(result, Err(DecodeError::UnrecognizedContainer(_))));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = Mp3Decoder::new().decode(AudioBuffer::new(b"definitely not audio".to_vec()));
        assert!(result.is_err());
    }

    #[test]
    fn test_average_channels_stereo() {
        let spec = SignalSpec::new(44100, Channels::FRONT_LEFT | Channels::FRONT_RIGHT);
        let mut buf = PcmBuffer::<f32>::new(4, spec);
        buf.render_reserved(Some(2));
        buf.chan_mut(0).copy_from_slice(&[1.0, 0.5]);
        buf.chan_mut(1).copy_from_slice(&[0.0, -0.5]);

        let mut out = Vec::new();
        average_channels(&buf, &mut out);
        assert_eq!(out, vec![0.5, 0.0]);
    }

    #[test]
    fn test_average_channels_converts_integer_samples() {
        let spec = SignalSpec::new(8000, Channels::FRONT_LEFT);
        let mut buf = PcmBuffer::<i16>::new(2, spec);
        buf.render_reserved(Some(2));
        buf.chan_mut(0).copy_from_slice(&[i16::MIN, 0]);

        let mut out = Vec::new();
        average_channels(&buf, &mut out);
        assert_eq!(out, vec![-1.0, 0.0]);
    }

    #[test]
    fn test_decoder_name() {
        assert_eq!(Mp3Decoder::new().name(), "symphonia-mp3");
    }
}
