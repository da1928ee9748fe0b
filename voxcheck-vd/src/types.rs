//! Core data model for voice detection
//!
//! Every value here is request-local: created when a request arrives,
//! consumed by the next pipeline stage, dropped when the response is sent.
//!
//! Data flow:
//! `AudioBuffer` → decoder → `SampleSequence` → extractor → `FeatureVector`
//! → classifier → `ClassificationResult`

use serde::{Deserialize, Serialize};

// ============================================================================
// Audio
// ============================================================================

/// Compressed audio bytes exactly as received (inline or downloaded)
///
/// No structure is assumed beyond "decodable by the configured decoder".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer(Vec<u8>);

impl AudioBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for AudioBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Decoded mono PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSequence {
    /// Mono samples, amplitude in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Native sample rate of the source (Hz)
    pub sample_rate: u32,
}

impl SampleSequence {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds (0.0 when the sample rate is 0)
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

// ============================================================================
// Features
// ============================================================================

/// Five acoustic statistics derived from one `SampleSequence`
///
/// All values are finite. A statistic that is undefined for the clip
/// (e.g. no pitched frames) is 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Mean of all pooled pitch estimates (Hz)
    pub pitch_mean: f64,
    /// Population standard deviation of pooled pitch estimates (Hz)
    pub pitch_std: f64,
    /// Population standard deviation of per-frame RMS
    pub energy_std: f64,
    /// Mean per-frame zero-crossing rate
    pub zcr_mean: f64,
    /// Population standard deviation of per-frame spectral centroid (Hz)
    pub centroid_std: f64,
}

impl FeatureVector {
    /// Name and value of every statistic, in declaration order
    pub fn named_values(&self) -> [(&'static str, f64); 5] {
        [
            ("pitchMean", self.pitch_mean),
            ("pitchStd", self.pitch_std),
            ("energyStd", self.energy_std),
            ("zcrMean", self.zcr_mean),
            ("centroidStd", self.centroid_std),
        ]
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    AiGenerated,
    Human,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::AiGenerated => "AI_GENERATED",
            Label::Human => "HUMAN",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one `FeatureVector`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: Label,
    /// Winning vote share rounded to 2 decimals
    pub confidence_score: f64,
    /// Fixed text keyed by label
    pub explanation: String,
    /// Number of rules that voted AI
    pub ai_score: usize,
    /// Number of rules that voted human
    pub human_score: usize,
}
