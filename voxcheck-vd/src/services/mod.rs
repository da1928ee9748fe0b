//! Detection services
//!
//! Core stages (extractor, classifier, pipeline) plus audio acquisition for
//! the HTTP boundary.

pub mod audio_source;
pub mod classifier;
pub mod feature_extractor;
pub mod pipeline;

pub use audio_source::{AudioFetcher, AudioSource, SourceError};
pub use classifier::{Classifier, Direction, Statistic, VoteRule};
pub use feature_extractor::{ExtractionError, FeatureExtractor};
pub use pipeline::{Pipeline, PipelineError};
