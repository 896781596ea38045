//! The fixed enhancement chain and its per-step parameters

use crate::model::AudioAsset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample rate of every enhanced asset
pub const CANONICAL_SAMPLE_RATE: u32 = 44_100;
/// Channel count of every enhanced asset
pub const CANONICAL_CHANNELS: usize = 2;
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;

/// Identifies a step of the chain, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    NormalizeContainer,
    AdjustTempo,
    EnhanceBass,
    Compress,
    NormalizeLoudness,
}

impl StepKind {
    pub const ORDER: [StepKind; 5] = [
        StepKind::NormalizeContainer,
        StepKind::AdjustTempo,
        StepKind::EnhanceBass,
        StepKind::Compress,
        StepKind::NormalizeLoudness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::NormalizeContainer => "normalize_container",
            StepKind::AdjustTempo => "adjust_tempo",
            StepKind::EnhanceBass => "enhance_bass",
            StepKind::Compress => "compress",
            StepKind::NormalizeLoudness => "normalize_loudness",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Soft-knee compander settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub attack_secs: f64,
    pub release_secs: f64,
    pub soft_knee_db: f64,
    /// Transfer curve as (input dB, output dB) points
    pub points: &'static [(f64, f64)],
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            attack_secs: 0.0,
            release_secs: 1.0,
            soft_knee_db: 6.0,
            points: &[(-90.0, -90.0), (-70.0, -70.0), (-30.0, -9.0), (0.0, -3.0)],
        }
    }
}

/// EBU R128 loudness target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessTarget {
    pub integrated_lufs: f64,
    pub range_lu: f64,
    pub true_peak_dbtp: f64,
}

impl Default for LoudnessTarget {
    fn default() -> Self {
        Self {
            integrated_lufs: -14.0,
            range_lu: 11.0,
            true_peak_dbtp: -1.0,
        }
    }
}

/// One fully parameterized step
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    /// Decode to canonical PCM. `demux_hint` forces the input container.
    NormalizeContainer { demux_hint: Option<&'static str> },
    /// Pitch-preserving time stretch
    AdjustTempo { ratio: f64 },
    /// Peaking EQ boost
    EnhanceBass {
        center_hz: f64,
        width_octaves: f64,
        gain_db: f64,
    },
    Compress(CompressorSettings),
    NormalizeLoudness(LoudnessTarget),
}

impl TransformStep {
    pub fn kind(&self) -> StepKind {
        match self {
            TransformStep::NormalizeContainer { .. } => StepKind::NormalizeContainer,
            TransformStep::AdjustTempo { .. } => StepKind::AdjustTempo,
            TransformStep::EnhanceBass { .. } => StepKind::EnhanceBass,
            TransformStep::Compress(_) => StepKind::Compress,
            TransformStep::NormalizeLoudness(_) => StepKind::NormalizeLoudness,
        }
    }

    /// Short human-readable parameter summary for logs
    pub fn describe(&self) -> String {
        match self {
            TransformStep::NormalizeContainer { demux_hint } => match demux_hint {
                Some(hint) => format!("{} Hz stereo PCM, forced demuxer {}", CANONICAL_SAMPLE_RATE, hint),
                None => format!("{} Hz stereo PCM", CANONICAL_SAMPLE_RATE),
            },
            TransformStep::AdjustTempo { ratio } => format!("tempo x{:.3}", ratio),
            TransformStep::EnhanceBass {
                center_hz, gain_db, ..
            } => format!("{:+.1} dB at {} Hz", gain_db, center_hz),
            TransformStep::Compress(c) => format!("soft knee {} dB", c.soft_knee_db),
            TransformStep::NormalizeLoudness(t) => format!(
                "I={} LUFS, LRA={} LU, TP={} dBTP",
                t.integrated_lufs, t.range_lu, t.true_peak_dbtp
            ),
        }
    }
}

/// Containers the backend misdetects unless told the demuxer explicitly
pub fn demux_hint_for(asset: &AudioAsset) -> Option<&'static str> {
    let is_mp4_family = matches!(asset.format.as_str(), "m4a" | "mp4")
        || asset.file_name().to_lowercase().contains("_original.m4a");
    is_mp4_family.then_some("mp4")
}
