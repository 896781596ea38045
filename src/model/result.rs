use super::analysis::{AnalysisOrigin, AnalysisResult, Segments};
use super::asset::AudioAsset;
use crate::error::PipelineError;
use crate::score::ViralScore;
use crate::transform::{
    TransformPlan, CANONICAL_BITS_PER_SAMPLE, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE,
};
use crate::waveform::WaveformEnvelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const RESULT_TITLE: &str = "Optimized for Social Media";
const TARGET_PLATFORMS: [&str; 2] = ["TikTok", "Instagram"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnhancementLevel {
    High,
    Medium,
}

impl EnhancementLevel {
    pub fn from_score(score: ViralScore) -> Self {
        if score.is_high() {
            EnhancementLevel::High
        } else {
            EnhancementLevel::Medium
        }
    }
}

impl fmt::Display for EnhancementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhancementLevel::High => f.write_str("High"),
            EnhancementLevel::Medium => f.write_str("Medium"),
        }
    }
}

/// Before/after envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveforms {
    pub before: WaveformEnvelope,
    pub after: WaveformEnvelope,
}

/// Display labels for the result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub title: String,
    /// e.g. "128 BPM" (tempo of the original)
    pub tempo: String,
    /// e.g. "0.80"
    pub energy: String,
    pub format: String,
    pub sample_rate: String,
    pub bit_rate: String,
    pub enhancement_level: EnhancementLevel,
    pub optimized_segments: usize,
    pub optimized_for: Vec<String>,
}

impl ResultMetadata {
    pub fn describe(analysis: &AnalysisResult, score: ViralScore) -> Self {
        let bit_rate_kbps = CANONICAL_SAMPLE_RATE as usize
            * CANONICAL_CHANNELS
            * CANONICAL_BITS_PER_SAMPLE as usize
            / 1000;

        Self {
            title: RESULT_TITLE.to_string(),
            tempo: format!("{} BPM", analysis.tempo.round() as i64),
            energy: format!("{:.2}", analysis.energy),
            format: "WAV".to_string(),
            sample_rate: format!("{:.1} kHz", CANONICAL_SAMPLE_RATE as f64 / 1000.0),
            bit_rate: format!("{} kbps", bit_rate_kbps),
            enhancement_level: EnhancementLevel::from_score(score),
            optimized_segments: analysis.segments.total_count(),
            optimized_for: TARGET_PLATFORMS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub run_id: String,
    pub original: AudioAsset,
    pub enhanced: AudioAsset,
    pub waveforms: Waveforms,
    pub segments: Segments,
    pub analysis_origin: AnalysisOrigin,
    pub viral_score: ViralScore,
    pub plan: TransformPlan,
    pub metadata: ResultMetadata,
    pub completed_at: DateTime<Utc>,
}

impl ProcessingResult {
    pub fn assemble(
        run_id: impl Into<String>,
        original: AudioAsset,
        enhanced: AudioAsset,
        analysis: &AnalysisResult,
        plan: TransformPlan,
        waveforms: Waveforms,
        viral_score: ViralScore,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            original,
            enhanced,
            waveforms,
            segments: analysis.segments.clone(),
            analysis_origin: analysis.origin,
            viral_score,
            plan,
            metadata: ResultMetadata::describe(analysis, viral_score),
            completed_at: Utc::now(),
        }
    }
}

/// Status record for one run, as kept by an external status store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProcessingReport {
    Completed(Box<ProcessingResult>),
    Failed {
        id: String,
        kind: String,
        error: String,
    },
}

impl ProcessingReport {
    pub fn from_outcome(asset_id: &str, outcome: Result<ProcessingResult, PipelineError>) -> Self {
        match outcome {
            Ok(result) => ProcessingReport::Completed(Box::new(result)),
            Err(e) => ProcessingReport::Failed {
                id: asset_id.to_string(),
                kind: e.kind().to_string(),
                error: e.to_string(),
            },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProcessingReport::Completed(_))
    }
}
