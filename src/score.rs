//! Viral potential score
//!
//! A deterministic function of an [`AnalysisResult`], so a stored analysis
//! can be re-scored without running the analyzer again.

use crate::model::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fmt;

const BASE_SCORE: f64 = 50.0;
const PRIME_TEMPO_BONUS: f64 = 15.0;
const NEAR_TEMPO_BONUS: f64 = 7.0;
const ENERGY_WEIGHT: f64 = 20.0;
const POINTS_PER_SEGMENT: f64 = 3.0;
const MAX_STRUCTURE_BONUS: f64 = 15.0;

/// Scores above this are reported as a "High" enhancement level
pub const HIGH_ENHANCEMENT_THRESHOLD: u8 = 75;

/// Score in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViralScore(u8);

impl ViralScore {
    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_high(&self) -> bool {
        self.0 > HIGH_ENHANCEMENT_THRESHOLD
    }
}

impl fmt::Display for ViralScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Score an analysis
pub fn score(analysis: &AnalysisResult) -> ViralScore {
    let structure_bonus =
        (POINTS_PER_SEGMENT * analysis.segments.total_count() as f64).min(MAX_STRUCTURE_BONUS);

    let raw = BASE_SCORE
        + tempo_bonus(analysis.tempo)
        + analysis.energy * ENERGY_WEIGHT
        + structure_bonus;

    ViralScore(raw.clamp(0.0, 100.0).round() as u8)
}

/// 115–145 BPM is the sweet spot; 100–160 still earns a partial bonus
fn tempo_bonus(tempo: f64) -> f64 {
    if (115.0..=145.0).contains(&tempo) {
        PRIME_TEMPO_BONUS
    } else if (100.0..=160.0).contains(&tempo) {
        NEAR_TEMPO_BONUS
    } else {
        0.0
    }
}
