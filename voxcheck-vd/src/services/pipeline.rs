//! Detection pipeline: decode -> extract -> classify
//!
//! Synchronous and request-scoped. Callers on the async runtime move `run`
//! onto the blocking pool.

use thiserror::Error;
use tracing::debug;

use crate::services::classifier::Classifier;
use crate::services::feature_extractor::{ExtractionError, FeatureExtractor};
use crate::types::{AudioBuffer, ClassificationResult};
use crate::utils::audio_decoder::{AudioDecoder, DecodeError, Mp3Decoder};

/// Failure of a single pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Immutable composition of the three stages
///
/// Shared across requests behind an `Arc`; holds no per-run state.
pub struct Pipeline {
    decoder: Box<dyn AudioDecoder>,
    extractor: FeatureExtractor,
    classifier: Classifier,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Box::new(Mp3Decoder::new()), FeatureExtractor::default(), Classifier::default())
    }
}

impl Pipeline {
    pub fn new(decoder: Box<dyn AudioDecoder>, extractor: FeatureExtractor, classifier: Classifier) -> Self {
        Self {
            decoder,
            extractor,
            classifier,
        }
    }

    /// MP3 pipeline with a custom classifier
    pub fn with_classifier(classifier: Classifier) -> Self {
        Self::new(Box::new(Mp3Decoder::new()), FeatureExtractor::default(), classifier)
    }

    /// Run all three stages over one buffer
    ///
    /// The buffer is consumed; its bytes are released once decoding finishes.
    pub fn run(&self, buffer: AudioBuffer) -> Result<ClassificationResult, PipelineError> {
        debug!(decoder = self.decoder.name(), bytes = buffer.len(), "Pipeline run started");

        let sequence = self.decoder.decode(buffer)?;
        let features = self.extractor.extract(&sequence)?;

        debug!(
            pitch_mean = features.pitch_mean,
            pitch_std = features.pitch_std,
            energy_std = features.energy_std,
            zcr_mean = features.zcr_mean,
            centroid_std = features.centroid_std,
            "Features extracted"
        );

        let result = self.classifier.classify(&features);

        debug!(
            label = result.label.as_str(),
            ai_score = result.ai_score,
            human_score = result.human_score,
            "Pipeline run complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Label, SampleSequence};

    /// Ignores its input and returns a fixed sequence
    struct FixedDecoder(SampleSequence);

    impl AudioDecoder for FixedDecoder {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn decode(&self, _buffer: AudioBuffer) -> Result<SampleSequence, DecodeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_malformed_bytes_abort_before_extraction() {
        let pipeline = Pipeline::default();
        let result = pipeline.run(AudioBuffer::new(b"not an mp3 at all".to_vec()));
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_extraction_error_propagates() {
        let decoder = FixedDecoder(SampleSequence::new(vec![0.0; 1024], 0));
        let pipeline = Pipeline::new(Box::new(decoder), FeatureExtractor::default(), Classifier::default());
        let result = pipeline.run(AudioBuffer::new(vec![1]));
        assert!(matches!(
            result,
            Err(PipelineError::Extraction(ExtractionError::InvalidSampleRate(0)))
        ));
    }

    #[test]
    fn test_silence_classified() {
        // Silence: every statistic is 0, so every rule votes AI
        let decoder = FixedDecoder(SampleSequence::new(vec![0.0; 16000], 16000));
        let pipeline = Pipeline::new(Box::new(decoder), FeatureExtractor::default(), Classifier::default());
        let result = pipeline.run(AudioBuffer::new(vec![1])).unwrap();
        assert_eq!(result.label, Label::AiGenerated);
        assert_eq!(result.confidence_score, 1.0);
    }
}
