//! Musical Enchanter - audio enhancement pipeline for short-form social video
//!
//! Analyzes an uploaded track, runs it through a fixed enhancement chain
//! (tempo, bass, compression, loudness), and reports before/after waveforms
//! together with a heuristic "viral" score.

pub mod analysis;
pub mod decode;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod score;
pub mod transform;
pub mod waveform;

pub const APP_NAME: &str = "musical-enchanter";

pub use error::{AnalysisUnavailable, BackendError, ConfigError, PipelineError};
pub use model::{AudioAsset, ProcessingReport, ProcessingResult};
pub use pipeline::{Pipeline, PipelineConfig};
