//! Analyzer trait definition

use crate::error::AnalysisUnavailable;
use crate::model::{AnalysisResult, AudioAsset};

/// Feature extractor - allows swapping between the external process and fakes
pub trait Analyzer: Send + Sync {
    /// Derive tempo, energy and segment markers for an asset
    fn analyze(&self, asset: &AudioAsset) -> Result<AnalysisResult, AnalysisUnavailable>;

    /// Name of this analyzer (for logging)
    fn name(&self) -> &'static str;
}
