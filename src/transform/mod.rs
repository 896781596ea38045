//! Signal transform stage
//!
//! A fixed chain of five steps (container normalization, tempo, bass,
//! compression, loudness) parameterized by a [`TransformPlan`]. Steps are
//! executed by a [`Transformer`] backend: ffmpeg in production, an in-process
//! recorder in tests.

mod chain;
mod ffmpeg;
mod plan;
mod recording;
mod steps;
mod traits;

pub use chain::enhance;
pub use ffmpeg::{audio_filter, FfmpegTransformer};
pub use plan::{TransformPlan, IDEAL_TEMPO, MAX_TEMPO_RATIO, MIN_TEMPO_RATIO};
pub use recording::RecordingTransformer;
pub use steps::{
    demux_hint_for, CompressorSettings, LoudnessTarget, StepKind, TransformStep,
    CANONICAL_BITS_PER_SAMPLE, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE,
};
pub use traits::Transformer;
