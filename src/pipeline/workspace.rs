//! Output and scratch directory layout

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// Manages where a run writes
pub struct Workspace {
    /// Published enhanced assets
    output_dir: PathBuf,

    /// Parent of per-run scratch directories
    work_dir: PathBuf,
}

impl Workspace {
    pub fn new(output_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            output_dir,
            work_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Final location of the enhanced asset for `asset_id`
    ///
    /// Always `<output_dir>/<id>_enhanced.wav`, so a re-run overwrites the
    /// previous result instead of accumulating copies.
    pub fn enhanced_path(&self, asset_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_enhanced.wav", sanitize_component(asset_id)))
    }

    /// Create a fresh scratch directory for one run
    ///
    /// The directory and everything in it is removed when the returned
    /// handle is dropped, whichever way the run ends.
    pub fn create_run_dir(&self, asset_id: &str, run_id: &Uuid) -> io::Result<TempDir> {
        fs::create_dir_all(&self.work_dir)?;
        let prefix = format!("{}-{}-", sanitize_component(asset_id), run_id.simple());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&self.work_dir)?;
        log::debug!("Run directory {:?}", dir.path());
        Ok(dir)
    }
}

/// Replace anything that is not safe in a single path component
fn sanitize_component(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "asset".to_string(),
        trimmed => trimmed.to_string(),
    }
}
