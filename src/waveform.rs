//! Waveform envelopes for before/after visualization
//!
//! An envelope is a fixed number of amplitude points in [0, 100], taken by
//! strided subsampling of the first channel. Visualization must always have
//! something to draw, so undecodable input yields a synthesized envelope.

use crate::decode::decode_first_channel;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Points per envelope unless configured otherwise
pub const DEFAULT_POINTS: usize = 100;

const FULL_SCALE: f32 = 100.0;
const FALLBACK_RANGE: Range<f32> = 10.0..80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveformEnvelope(Vec<f32>);

impl WaveformEnvelope {
    pub fn points(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn peak(&self) -> f32 {
        self.0.iter().copied().fold(0.0, f32::max)
    }
}

/// Summarize the audio file at `path` into `points` amplitude values
pub fn summarize(path: &Path, points: usize) -> WaveformEnvelope {
    match decode_first_channel(path) {
        Ok(samples) if !samples.is_empty() => {
            let envelope = envelope_from_samples(&samples, points);
            log::debug!(
                "Waveform for {:?}: {} points, peak {:.1}",
                path,
                envelope.len(),
                envelope.peak()
            );
            envelope
        }
        Ok(_) => {
            log::warn!("No samples decoded from {:?}; using synthesized waveform", path);
            synthesized(points, &mut rand::rng())
        }
        Err(e) => {
            log::warn!("Waveform decode failed for {:?} ({:#}); using synthesized waveform", path, e);
            synthesized(points, &mut rand::rng())
        }
    }
}

/// Strided subsampling of normalized samples
///
/// Point `i` is `|samples[i * step]| * 100` with `step = len / points`,
/// clamped to 100. Inputs shorter than `points` are spread evenly instead,
/// so the envelope always has exactly `points` entries.
pub fn envelope_from_samples(samples: &[f32], points: usize) -> WaveformEnvelope {
    if points == 0 {
        return WaveformEnvelope(Vec::new());
    }
    if samples.is_empty() {
        return WaveformEnvelope(vec![0.0; points]);
    }

    let total = samples.len();
    let step = total / points;

    let values = (0..points)
        .map(|i| {
            let idx = if step > 0 { i * step } else { i * total / points };
            (samples[idx].abs() * FULL_SCALE).min(FULL_SCALE)
        })
        .collect();

    WaveformEnvelope(values)
}

/// Uniformly random envelope within [10, 80)
pub fn synthesized<R: Rng>(points: usize, rng: &mut R) -> WaveformEnvelope {
    WaveformEnvelope((0..points).map(|_| rng.random_range(FALLBACK_RANGE)).collect())
}
