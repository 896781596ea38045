//! Deterministic in-process transformer for tests and dry runs
//!
//! Copies its input to its output unchanged and remembers which steps ran.

use super::steps::{StepKind, TransformStep};
use super::traits::Transformer;
use crate::error::BackendError;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

#[derive(Default)]
pub struct RecordingTransformer {
    applied: Mutex<Vec<StepKind>>,
    fail_at: Option<StepKind>,
}

impl RecordingTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail when `step` is reached, after leaving a truncated output behind
    pub fn failing_at(step: StepKind) -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            fail_at: Some(step),
        }
    }

    /// Steps applied so far, across all runs
    pub fn applied(&self) -> Vec<StepKind> {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transformer for RecordingTransformer {
    fn apply(&self, step: &TransformStep, input: &Path, output: &Path) -> Result<(), BackendError> {
        let kind = step.kind();
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(kind);

        if self.fail_at == Some(kind) {
            fs::write(output, b"RIFF")?;
            return Err(BackendError::Simulated(kind));
        }

        log::debug!("Recording {} ({}): {:?} -> {:?}", kind, step.describe(), input, output);
        fs::copy(input, output)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
