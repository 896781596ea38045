use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(start, end)` span in seconds, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval(pub f64, pub f64);

impl Interval {
    pub fn start(&self) -> f64 {
        self.0
    }

    pub fn end(&self) -> f64 {
        self.1
    }

    /// Finite, non-negative and `start <= end`
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.0 >= 0.0 && self.0 <= self.1
    }
}

/// Structural segment categories reported by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Hooks,
    Drops,
    Transitions,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 3] = [SegmentKind::Hooks, SegmentKind::Drops, SegmentKind::Transitions];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Hooks => "hooks",
            SegmentKind::Drops => "drops",
            SegmentKind::Transitions => "transitions",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment markers grouped by kind, each list in time order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segments {
    pub hooks: Vec<Interval>,
    pub drops: Vec<Interval>,
    pub transitions: Vec<Interval>,
}

impl Segments {
    pub fn get(&self, kind: SegmentKind) -> &[Interval] {
        match kind {
            SegmentKind::Hooks => &self.hooks,
            SegmentKind::Drops => &self.drops,
            SegmentKind::Transitions => &self.transitions,
        }
    }

    /// All intervals tagged with their kind
    pub fn iter(&self) -> impl Iterator<Item = (SegmentKind, &Interval)> + '_ {
        SegmentKind::ALL
            .into_iter()
            .flat_map(move |kind| self.get(kind).iter().map(move |i| (kind, i)))
    }

    /// Number of intervals across all kinds
    pub fn total_count(&self) -> usize {
        self.hooks.len() + self.drops.len() + self.transitions.len()
    }
}

/// Where an [`AnalysisResult`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisOrigin {
    /// Reported by the analyzer
    #[default]
    Measured,
    /// Substituted because the analyzer was unavailable
    Synthesized,
}

/// Features that drive the transform plan and the viral score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Beats per minute
    pub tempo: f64,

    /// Overall energy in [0, 1]
    pub energy: f64,

    #[serde(default)]
    pub segments: Segments,

    #[serde(default)]
    pub origin: AnalysisOrigin,
}

impl AnalysisResult {
    pub fn new(tempo: f64, energy: f64, segments: Segments) -> Self {
        Self {
            tempo,
            energy,
            segments,
            origin: AnalysisOrigin::Measured,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.origin == AnalysisOrigin::Synthesized
    }

    /// Check the value ranges downstream stages rely on
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tempo.is_finite() && self.tempo > 0.0) {
            return Err(format!("tempo must be positive, got {}", self.tempo));
        }
        if !(0.0..=1.0).contains(&self.energy) {
            return Err(format!("energy must be within [0, 1], got {}", self.energy));
        }
        if let Some((kind, interval)) = self.segments.iter().find(|(_, i)| !i.is_valid()) {
            return Err(format!(
                "invalid {} interval [{}, {}]",
                kind,
                interval.start(),
                interval.end()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult::new(
            128.0,
            0.8,
            Segments {
                hooks: vec![Interval(15.0, 25.0), Interval(45.0, 55.0)],
                drops: vec![Interval(30.0, 35.0)],
                transitions: vec![Interval(25.0, 30.0), Interval(55.0, 60.0)],
            },
        )
    }

    #[test]
    fn test_segment_counting() {
        let analysis = sample();
        assert_eq!(analysis.segments.total_count(), 5);
        assert_eq!(analysis.segments.get(SegmentKind::Drops).len(), 1);
        let kinds: Vec<_> = analysis.segments.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds.first(), Some(&SegmentKind::Hooks));
        assert_eq!(kinds.last(), Some(&SegmentKind::Transitions));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        assert!(sample().validate().is_ok());

        let mut bad = sample();
        bad.tempo = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.energy = 1.5;
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.energy = f64::NAN;
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.segments.drops.push(Interval(40.0, 39.0));
        assert!(bad.validate().unwrap_err().contains("drops"));

        let mut bad = sample();
        bad.segments.hooks.push(Interval(-1.0, 2.0));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_intervals_serialize_as_pairs() {
        let json = serde_json::to_string(&sample().segments).unwrap();
        assert!(json.starts_with(r#"{"hooks":[[15.0,25.0],[45.0,55.0]]"#));

        let segments: Segments = serde_json::from_str(r#"{"hooks": [[1, 2]]}"#).unwrap();
        assert_eq!(segments.hooks, vec![Interval(1.0, 2.0)]);
        assert!(segments.drops.is_empty());
    }
}
