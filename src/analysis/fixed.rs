//! Analyzer that returns a preset answer
//!
//! Used by tests, and by the CLI's `--no-analysis` mode where it always
//! reports itself unavailable so synthesized features are used.

use super::traits::Analyzer;
use crate::error::AnalysisUnavailable;
use crate::model::{AnalysisResult, AudioAsset};

pub struct FixedAnalyzer {
    result: Option<AnalysisResult>,
}

impl FixedAnalyzer {
    /// Always return `result`
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            result: Some(result),
        }
    }

    /// Always fail with [`AnalysisUnavailable::Disabled`]
    pub fn unavailable() -> Self {
        Self { result: None }
    }
}

impl Analyzer for FixedAnalyzer {
    fn analyze(&self, asset: &AudioAsset) -> Result<AnalysisResult, AnalysisUnavailable> {
        log::debug!("Fixed analysis for {:?}", asset.path);
        self.result.clone().ok_or(AnalysisUnavailable::Disabled)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
