//! Feature analysis layer
//!
//! Tempo, energy and segment markers come from an [`Analyzer`]. The external
//! process is the real implementation; when it is missing or misbehaves the
//! pipeline substitutes synthesized features instead of failing.

mod external;
mod fallback;
mod fixed;
mod traits;

pub use external::{parse_payload, ExternalAnalyzer};
pub use fallback::{analyze_or_synthesize, synthesize};
pub use fixed::FixedAnalyzer;
pub use traits::Analyzer;
