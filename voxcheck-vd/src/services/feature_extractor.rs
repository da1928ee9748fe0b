//! Acoustic Feature Extractor
//!
//! Computes the five statistics the classifier votes on, using short-time
//! analysis over centred, overlapping frames.
//!
//! # Extracted Features
//! - Pitch mean / std (spectral peak tracking, pooled over all frames)
//! - Energy std (per-frame RMS)
//! - Zero-crossing rate mean
//! - Spectral centroid std
//!
//! # Framing
//! The signal is padded by `frame_length / 2` samples on both sides, so
//! frame `t` is centred on sample `t * hop_length` and every clip, however
//! short, produces at least one frame. RMS and the spectrum use zero
//! padding; zero-crossing rate repeats the edge samples. Only the
//! zero-padded signal is materialised; edge-padded frames are rebuilt on
//! demand for the few frames that overlap the padding.
//!
//! Extraction is pure and deterministic: identical input yields a
//! bit-identical `FeatureVector`.

use realfft::RealFftPlanner;
use thiserror::Error;
use tracing::debug;

use crate::types::{FeatureVector, SampleSequence};

/// Analysis frame length in samples (also the FFT size)
pub const FRAME_LENGTH: usize = 2048;

/// Stride between successive frames in samples
pub const HOP_LENGTH: usize = 512;

/// Lowest frequency considered a pitch candidate (Hz)
pub const PITCH_FMIN_HZ: f64 = 150.0;

/// Upper bound (exclusive) for pitch candidates (Hz), clamped to Nyquist
pub const PITCH_FMAX_HZ: f64 = 4000.0;

/// A spectral peak must exceed this fraction of its frame's maximum magnitude
pub const PITCH_PEAK_THRESHOLD: f64 = 0.1;

/// Samples with magnitude at or below this count as exactly zero for ZCR
pub const ZERO_AMPLITUDE_THRESHOLD: f64 = 1e-10;

/// Feature extraction failures
///
/// Short or silent clips never produce these; they yield zero statistics.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("Non-finite sample at index {0}")]
    NonFiniteSample(usize),

    #[error("Invalid analysis parameters: {0}")]
    InvalidParameters(String),

    #[error("Spectral transform failed: {0}")]
    Transform(String),

    #[error("Statistic {0} is not finite")]
    NonFiniteStatistic(&'static str),
}

/// Short-time feature extractor
///
/// Field defaults are the module constants; tests override them to pin
/// exact frame boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureExtractor {
    pub frame_length: usize,
    pub hop_length: usize,
    pub pitch_fmin_hz: f64,
    pub pitch_fmax_hz: f64,
    pub pitch_peak_threshold: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            frame_length: FRAME_LENGTH,
            hop_length: HOP_LENGTH,
            pitch_fmin_hz: PITCH_FMIN_HZ,
            pitch_fmax_hz: PITCH_FMAX_HZ,
            pitch_peak_threshold: PITCH_PEAK_THRESHOLD,
        }
    }
}

/// Extract features with the default analysis parameters
pub fn extract(sequence: &SampleSequence) -> Result<FeatureVector, ExtractionError> {
    FeatureExtractor::default().extract(sequence)
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of analysis frames produced for `num_samples` samples
    pub fn frame_count(&self, num_samples: usize) -> usize {
        let padded = (num_samples + 2 * (self.frame_length / 2)).max(self.frame_length);
        1 + (padded - self.frame_length) / self.hop_length
    }

    /// Compute the feature vector for one sample sequence
    ///
    /// # Errors
    /// - Sample rate of 0
    /// - NaN or infinite samples
    /// - Degenerate frame/hop parameters
    /// - FFT failure or a non-finite statistic
    pub fn extract(&self, sequence: &SampleSequence) -> Result<FeatureVector, ExtractionError> {
        self.validate(sequence)?;

        let sample_rate = sequence.sample_rate as f64;
        let samples = &sequence.samples;

        debug!(
            sample_count = samples.len(),
            sample_rate = sequence.sample_rate,
            frames = self.frame_count(samples.len()),
            "Extracting acoustic features"
        );

        let zero_padded = pad_centered(samples, self.frame_length);

        // Energy
        let rms: Vec<f64> = self.frames(&zero_padded).map(frame_rms).collect();

        // Zero-crossing rate over the edge-padded signal
        let pad = self.frame_length / 2;
        let mut edge_frame = Vec::with_capacity(self.frame_length);
        let zcr: Vec<f64> = self
            .frames(&zero_padded)
            .enumerate()
            .map(|(index, frame)| {
                let start = index * self.hop_length;
                if start >= pad && start + self.frame_length <= pad + samples.len() {
                    frame_zero_crossing_rate(frame)
                } else {
                    fill_edge_frame(samples, start, self.frame_length, &mut edge_frame);
                    frame_zero_crossing_rate(&edge_frame)
                }
            })
            .collect();

        // Spectral centroid + pitch candidates share one STFT pass
        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(self.frame_length);
        let window = hann_window(self.frame_length);
        let mut input = fft.make_input_vec();
        let mut spectrum = fft.make_output_vec();
        let mut magnitudes = vec![0.0f64; spectrum.len()];

        let bin_hz = sample_rate / self.frame_length as f64;
        let fmin = self.pitch_fmin_hz.max(0.0);
        let fmax = self.pitch_fmax_hz.min(sample_rate / 2.0);

        let mut centroids = Vec::with_capacity(rms.len());
        let mut pitches = Vec::new();

        for frame in self.frames(&zero_padded) {
            for ((dst, &x), &w) in input.iter_mut().zip(frame).zip(&window) {
                *dst = x * w;
            }

            fft.process(&mut input, &mut spectrum)
                .map_err(|e| ExtractionError::Transform(e.to_string()))?;

            for (mag, bin) in magnitudes.iter_mut().zip(&spectrum) {
                *mag = bin.norm();
            }

            centroids.push(spectral_centroid(&magnitudes, bin_hz));
            collect_pitch_candidates(
                &magnitudes,
                bin_hz,
                fmin,
                fmax,
                self.pitch_peak_threshold,
                &mut pitches,
            );
        }

        // Non-positive estimates are discarded after pooling all frames
        pitches.retain(|&p| p > 0.0);

        let features = FeatureVector {
            pitch_mean: mean(&pitches),
            pitch_std: population_std(&pitches),
            energy_std: population_std(&rms),
            zcr_mean: mean(&zcr),
            centroid_std: population_std(&centroids),
        };

        for (name, value) in features.named_values() {
            if !value.is_finite() {
                return Err(ExtractionError::NonFiniteStatistic(name));
            }
        }

        debug!(
            pitch_candidates = pitches.len(),
            pitch_mean = features.pitch_mean,
            pitch_std = features.pitch_std,
            energy_std = features.energy_std,
            zcr_mean = features.zcr_mean,
            centroid_std = features.centroid_std,
            "Feature extraction complete"
        );

        Ok(features)
    }

    fn validate(&self, sequence: &SampleSequence) -> Result<(), ExtractionError> {
        if sequence.sample_rate == 0 {
            return Err(ExtractionError::InvalidSampleRate(sequence.sample_rate));
        }

        if self.frame_length < 4 || self.hop_length == 0 {
            return Err(ExtractionError::InvalidParameters(format!(
                "frame_length={} hop_length={}",
                self.frame_length, self.hop_length
            )));
        }

        if let Some(index) = sequence.samples.iter().position(|s| !s.is_finite()) {
            return Err(ExtractionError::NonFiniteSample(index));
        }

        Ok(())
    }

    /// Overlapping frames of a padded signal
    fn frames<'a>(&self, padded: &'a [f64]) -> impl Iterator<Item = &'a [f64]> {
        padded.windows(self.frame_length).step_by(self.hop_length)
    }
}

/// Zero-pad half a frame on each side (and up to one full frame in total)
fn pad_centered(samples: &[f32], frame_length: usize) -> Vec<f64> {
    let pad = frame_length / 2;

    let mut padded = Vec::with_capacity((samples.len() + 2 * pad).max(frame_length));
    padded.resize(pad, 0.0);
    padded.extend(samples.iter().map(|&s| s as f64));
    padded.resize((padded.len() + pad).max(frame_length), 0.0);

    padded
}

/// Frame at padded offset `start` of the signal edge-padded by
/// `frame_length / 2` on each side, written into `out`
///
/// Positions before the first sample repeat it; positions past the last
/// sample repeat that one. An empty signal yields zeros.
fn fill_edge_frame(samples: &[f32], start: usize, frame_length: usize, out: &mut Vec<f64>) {
    let pad = frame_length / 2;
    let last = samples.len().saturating_sub(1);

    out.clear();
    out.extend((start..start + frame_length).map(|position| {
        samples
            .get(position.saturating_sub(pad).min(last))
            .map_or(0.0, |&s| s as f64)
    }));
}

/// Periodic Hann window
fn hann_window(length: usize) -> Vec<f64> {
    (0..length)
        .map(|n| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / length as f64).cos())
        .collect()
}

/// Root-mean-square amplitude of one frame
fn frame_rms(frame: &[f64]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|x| x * x).sum::<f64>() / frame.len() as f64).sqrt()
}

/// Sign changes between adjacent samples divided by frame length
///
/// Near-zero samples count as zero and zero counts as positive.
fn frame_zero_crossing_rate(frame: &[f64]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }

    let is_negative = |x: f64| x < 0.0 && x.abs() > ZERO_AMPLITUDE_THRESHOLD;
    let crossings = frame
        .windows(2)
        .filter(|pair| is_negative(pair[0]) != is_negative(pair[1]))
        .count();

    crossings as f64 / frame.len() as f64
}

/// Magnitude-weighted mean frequency, 0.0 for an all-zero spectrum
fn spectral_centroid(magnitudes: &[f64], bin_hz: f64) -> f64 {
    let total: f64 = magnitudes.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = magnitudes
        .iter()
        .enumerate()
        .map(|(k, &m)| k as f64 * bin_hz * m)
        .sum();

    weighted / total
}

/// Push the interpolated frequency of every qualifying spectral peak
///
/// A bin qualifies when its frequency is in `[fmin, fmax)`, its magnitude
/// is above `threshold * max` and it is a local maximum of the thresholded
/// spectrum.
fn collect_pitch_candidates(
    magnitudes: &[f64],
    bin_hz: f64,
    fmin: f64,
    fmax: f64,
    threshold: f64,
    out: &mut Vec<f64>,
) {
    if magnitudes.is_empty() {
        return;
    }

    let peak = magnitudes.iter().cloned().fold(0.0f64, f64::max);
    let floor = threshold * peak;
    let masked = |k: usize| if magnitudes[k] > floor { magnitudes[k] } else { 0.0 };
    let last = magnitudes.len() - 1;

    for k in 0..magnitudes.len() {
        let freq = k as f64 * bin_hz;
        if freq < fmin || freq >= fmax {
            continue;
        }

        let current = masked(k);
        let prev = if k == 0 { current } else { masked(k - 1) };
        let next = if k == last { current } else { masked(k + 1) };
        if !(current > prev && current >= next) {
            continue;
        }

        let shift = if k == 0 || k == last {
            0.0
        } else {
            parabolic_shift(magnitudes[k - 1], magnitudes[k], magnitudes[k + 1])
        };

        out.push((k as f64 + shift) * bin_hz);
    }
}

/// Vertex offset (in bins) of the parabola through three neighbouring bins
///
/// 0.0 when the vertex would fall outside the centre bin.
fn parabolic_shift(prev: f64, current: f64, next: f64) -> f64 {
    let a = next + prev - 2.0 * current;
    let b = (next - prev) / 2.0;
    if b.abs() >= a.abs() {
        return 0.0;
    }
    -b / a
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation dividing by N
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

// ============================================================================
// Tests
// ============================================================================
