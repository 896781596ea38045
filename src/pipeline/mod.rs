//! Pipeline orchestration: configuration, run workspace, and the
//! analyze → enhance → summarize → score sequence

pub mod config;
pub mod pipeline;
pub mod workspace;

pub use config::{AnalyzerConfig, FfmpegConfig, PipelineConfig};
pub use pipeline::Pipeline;
pub use workspace::Workspace;
