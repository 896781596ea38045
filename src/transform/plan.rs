//! Transform parameters derived from analysis

use super::steps::{demux_hint_for, CompressorSettings, LoudnessTarget, TransformStep};
use crate::model::{AnalysisResult, AudioAsset};
use serde::{Deserialize, Serialize};

/// Tempo the stretch step aims for
pub const IDEAL_TEMPO: f64 = 120.0;
pub const MIN_TEMPO_RATIO: f64 = 0.90;
pub const MAX_TEMPO_RATIO: f64 = 1.15;

const LOW_ENERGY_THRESHOLD: f64 = 0.5;
const LOW_ENERGY_BASS_GAIN_DB: f64 = 6.0;
const BASS_GAIN_DB: f64 = 3.0;
const BASS_CENTER_HZ: f64 = 100.0;
const BASS_WIDTH_OCTAVES: f64 = 2.0;

/// Analysis-dependent parameters of the chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformPlan {
    /// Playback speed factor, always within [0.90, 1.15]
    pub tempo_ratio: f64,
    /// Bass shelf gain; quieter tracks get more
    pub bass_gain_db: f64,
}

impl TransformPlan {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        Self {
            tempo_ratio: tempo_ratio(analysis.tempo),
            bass_gain_db: if analysis.energy < LOW_ENERGY_THRESHOLD {
                LOW_ENERGY_BASS_GAIN_DB
            } else {
                BASS_GAIN_DB
            },
        }
    }

    /// The full chain for `asset`, in execution order
    pub fn steps(&self, asset: &AudioAsset) -> [TransformStep; 5] {
        [
            TransformStep::NormalizeContainer {
                demux_hint: demux_hint_for(asset),
            },
            TransformStep::AdjustTempo {
                ratio: self.tempo_ratio,
            },
            TransformStep::EnhanceBass {
                center_hz: BASS_CENTER_HZ,
                width_octaves: BASS_WIDTH_OCTAVES,
                gain_db: self.bass_gain_db,
            },
            TransformStep::Compress(CompressorSettings::default()),
            TransformStep::NormalizeLoudness(LoudnessTarget::default()),
        ]
    }
}

/// `IDEAL_TEMPO / tempo`, clamped. A tempo that is not a positive number
/// leaves the speed unchanged.
fn tempo_ratio(tempo: f64) -> f64 {
    if tempo.is_finite() && tempo > 0.0 {
        (IDEAL_TEMPO / tempo).clamp(MIN_TEMPO_RATIO, MAX_TEMPO_RATIO)
    } else {
        1.0
    }
}
