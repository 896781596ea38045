//! Transform backend trait

use super::steps::TransformStep;
use crate::error::BackendError;
use std::path::Path;

/// Backend capable of running one step of the chain
///
/// Implementations read `input` and write a complete file to `output`. They
/// must not touch `input`.
pub trait Transformer: Send + Sync {
    fn apply(&self, step: &TransformStep, input: &Path, output: &Path) -> Result<(), BackendError>;

    /// Name of this backend (for logging)
    fn name(&self) -> &'static str;
}
