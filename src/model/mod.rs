//! Data model shared by every pipeline stage
//!
//! Assets and analysis results flow in, a processing result (or a failed
//! report) flows out. All of it serializes to the JSON shape consumers read.

mod analysis;
mod asset;
mod result;

pub use analysis::{AnalysisOrigin, AnalysisResult, Interval, SegmentKind, Segments};
pub use asset::AudioAsset;
pub use result::{EnhancementLevel, ProcessingReport, ProcessingResult, ResultMetadata, Waveforms};
