//! Heuristic voice classifier
//!
//! Four independent threshold votes over the feature vector, folded into a
//! count. Three or more AI votes label the clip `AI_GENERATED`; anything
//! less labels it `HUMAN`. Confidence is the winning side's share of the
//! votes, rounded to two decimals.
//!
//! The rules are data (`VoteRule`), not branches, so thresholds can be
//! probed by tests and overridden from configuration without touching the
//! decision logic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ClassificationResult, FeatureVector, Label};

/// Pitch stability: AI when pitch std is below this (Hz)
pub const PITCH_STD_THRESHOLD: f64 = 20.0;

/// Energy variation: AI when RMS std is below this
pub const ENERGY_STD_THRESHOLD: f64 = 0.01;

/// Zero-crossing smoothness: AI when mean ZCR is below this
pub const ZCR_MEAN_THRESHOLD: f64 = 0.05;

/// Spectral consistency: AI when centroid std is below this (Hz)
pub const CENTROID_STD_THRESHOLD: f64 = 300.0;

/// Minimum AI votes for an `AI_GENERATED` label
pub const AI_MAJORITY: usize = 3;

pub const AI_EXPLANATION: &str =
    "Highly consistent pitch, energy, and spectral patterns indicate synthetic speech characteristics";

pub const HUMAN_EXPLANATION: &str =
    "Natural variations in pitch, energy, and articulation patterns detected";

/// Statistic a rule reads from the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    PitchMean,
    PitchStd,
    EnergyStd,
    ZcrMean,
    CentroidStd,
}

impl Statistic {
    pub fn read(&self, features: &FeatureVector) -> f64 {
        match self {
            Statistic::PitchMean => features.pitch_mean,
            Statistic::PitchStd => features.pitch_std,
            Statistic::EnergyStd => features.energy_std,
            Statistic::ZcrMean => features.zcr_mean,
            Statistic::CentroidStd => features.centroid_std,
        }
    }
}

/// Which side of the threshold votes AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// AI when `value < threshold`
    Below,
    /// AI when `value > threshold`
    Above,
}

/// One `(statistic, threshold, direction)` vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRule {
    pub name: String,
    pub statistic: Statistic,
    pub threshold: f64,
    pub direction: Direction,
}

impl VoteRule {
    pub fn new(name: impl Into<String>, statistic: Statistic, threshold: f64, direction: Direction) -> Self {
        Self {
            name: name.into(),
            statistic,
            threshold,
            direction,
        }
    }

    /// True when this rule votes AI for `features`
    ///
    /// NaN never satisfies a comparison, so it votes human.
    pub fn votes_ai(&self, features: &FeatureVector) -> bool {
        let value = self.statistic.read(features);
        match self.direction {
            Direction::Below => value < self.threshold,
            Direction::Above => value > self.threshold,
        }
    }
}

/// The standard four-rule table
pub fn default_rules() -> Vec<VoteRule> {
    vec![
        VoteRule::new("pitch_stability", Statistic::PitchStd, PITCH_STD_THRESHOLD, Direction::Below),
        VoteRule::new("energy_variation", Statistic::EnergyStd, ENERGY_STD_THRESHOLD, Direction::Below),
        VoteRule::new("zero_crossing_smoothness", Statistic::ZcrMean, ZCR_MEAN_THRESHOLD, Direction::Below),
        VoteRule::new("spectral_consistency", Statistic::CentroidStd, CENTROID_STD_THRESHOLD, Direction::Below),
    ]
}

/// Threshold-vote classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    rules: Vec<VoteRule>,
    ai_majority: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules(), AI_MAJORITY)
    }
}

impl Classifier {
    pub fn new(rules: Vec<VoteRule>, ai_majority: usize) -> Self {
        Self { rules, ai_majority }
    }

    pub fn rules(&self) -> &[VoteRule] {
        &self.rules
    }

    pub fn ai_majority(&self) -> usize {
        self.ai_majority
    }

    /// Replace the threshold of the rule reading `statistic`
    pub fn with_threshold(mut self, statistic: Statistic, threshold: f64) -> Self {
        for rule in self.rules.iter_mut().filter(|r| r.statistic == statistic) {
            rule.threshold = threshold;
        }
        self
    }

    pub fn with_ai_majority(mut self, ai_majority: usize) -> Self {
        self.ai_majority = ai_majority;
        self
    }

    /// Classify one feature vector
    ///
    /// Total: every input, including non-finite statistics, yields exactly
    /// one label with `ai_score + human_score == rules.len()`.
    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        let ai_score = self.rules.iter().filter(|rule| rule.votes_ai(features)).count();
        let human_score = self.rules.len() - ai_score;

        let (label, winning, explanation) = if ai_score >= self.ai_majority {
            (Label::AiGenerated, ai_score, AI_EXPLANATION)
        } else {
            (Label::Human, human_score, HUMAN_EXPLANATION)
        };

        let confidence_score = if self.rules.is_empty() {
            0.0
        } else {
            round2(winning as f64 / self.rules.len() as f64)
        };

        debug!(
            ai_score,
            human_score,
            label = label.as_str(),
            confidence_score,
            "Classification complete"
        );

        ClassificationResult {
            label,
            confidence_score,
            explanation: explanation.to_string(),
            ai_score,
            human_score,
        }
    }
}

/// Classify with the standard rule table
pub fn classify(features: &FeatureVector) -> ClassificationResult {
    Classifier::default().classify(features)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
