//! Pipeline configuration
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! output_dir = "/srv/processed"
//! workers = 4
//!
//! [analyzer]
//! program = "python3"
//! args = ["/opt/enchanter/audio_analyzer.py"]
//! timeout_secs = 60
//!
//! [ffmpeg]
//! binary = "/usr/local/bin/ffmpeg"
//! ```

use crate::error::ConfigError;
use crate::waveform::DEFAULT_POINTS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a pipeline instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Where enhanced assets are published
    pub output_dir: PathBuf,

    /// Parent of the per-run scratch directories
    pub work_dir: PathBuf,

    /// Points per waveform envelope
    pub waveform_points: usize,

    /// Batch parallelism. 0 = auto-detect (cores / 2, min 1)
    pub workers: usize,

    pub analyzer: AnalyzerConfig,
    pub ffmpeg: FfmpegConfig,
}

/// External feature analyzer invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub program: PathBuf,
    /// Passed before the asset path
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

/// ffmpeg invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    pub binary: PathBuf,
    /// Per step
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("processed"),
            work_dir: std::env::temp_dir().join(crate::APP_NAME),
            waveform_points: DEFAULT_POINTS,
            workers: 0,
            analyzer: AnalyzerConfig::default(),
            ffmpeg: FfmpegConfig::default(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["audio_analyzer.py".to_string()],
            timeout_secs: 120,
        }
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            timeout_secs: 600,
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FfmpegConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PipelineConfig {
    /// Create a configuration publishing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_waveform_points(mut self, points: usize) -> Self {
        self.waveform_points = points;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_ffmpeg(mut self, ffmpeg: FfmpegConfig) -> Self {
        self.ffmpeg = ffmpeg;
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load a TOML config file. Unlike a missing optional file, a file that
    /// was asked for but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1)
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }
}
