//! Error types shared across the pipeline

use crate::process::ProcessError;
use crate::transform::StepKind;
use std::path::PathBuf;
use thiserror::Error;

/// Why the external analyzer could not supply features.
///
/// Never surfaced to pipeline callers: every variant is recovered by
/// substituting synthesized features.
#[derive(Debug, Error)]
pub enum AnalysisUnavailable {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("analyzer exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("analyzer output is not a valid payload: {0}")]
    Malformed(String),

    #[error("analyzer reported an error: {0}")]
    Reported(String),

    #[error("analysis values out of range: {0}")]
    Invalid(String),

    #[error("analysis disabled")]
    Disabled,
}

/// Failure of a single transform backend invocation
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("backend produced no output at {0:?}")]
    MissingOutput(PathBuf),

    #[error("output is {sample_rate} Hz / {channels} ch, expected {expected_rate} Hz / {expected_channels} ch")]
    FormatMismatch {
        sample_rate: u32,
        channels: usize,
        expected_rate: u32,
        expected_channels: usize,
    },

    #[error("simulated failure at step {0}")]
    Simulated(StepKind),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal failure of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("asset not found: {0:?}")]
    AssetNotFound(PathBuf),

    #[error("transform step `{step}` failed: {source}")]
    TransformFailure {
        step: StepKind,
        #[source]
        source: BackendError,
    },

    #[error("asset {id} would publish to {path:?}, already claimed by another asset in the batch")]
    DuplicateOutput { id: String, path: PathBuf },

    #[error("workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Stable machine-readable tag for status records
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::AssetNotFound(_) => "asset_not_found",
            PipelineError::TransformFailure { .. } => "transform_failure",
            PipelineError::DuplicateOutput { .. } => "duplicate_output",
            PipelineError::Workspace(_) => "workspace",
            PipelineError::WorkerPool(_) => "worker_pool",
        }
    }

    /// The failing step, for transform failures
    pub fn step(&self) -> Option<StepKind> {
        match self {
            PipelineError::TransformFailure { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Configuration file could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
