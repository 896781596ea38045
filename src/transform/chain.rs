//! Runs the enhancement chain for one asset
//!
//! Intermediates live in the caller's run directory. Each one is removed as
//! soon as the following step has consumed it, and the last one is moved to
//! the destination only after every step succeeded.

use super::plan::TransformPlan;
use super::steps::{StepKind, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE};
use super::traits::Transformer;
use crate::decode::probe_format;
use crate::error::{BackendError, PipelineError};
use crate::model::AudioAsset;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Apply every step of `plan` to `asset` and publish the result at `destination`
pub fn enhance<T: Transformer + ?Sized>(
    transformer: &T,
    asset: &AudioAsset,
    plan: &TransformPlan,
    run_dir: &Path,
    destination: &Path,
) -> Result<AudioAsset, PipelineError> {
    let steps = plan.steps(asset);
    let total = steps.len();
    log::info!(
        "Enhancing {:?} with {} backend ({} steps)",
        asset.path,
        transformer.name(),
        total
    );

    let mut current: PathBuf = asset.path.clone();
    let mut current_is_intermediate = false;

    for (index, step) in steps.iter().enumerate() {
        let kind = step.kind();
        let output = run_dir.join(format!("{:02}_{}.wav", index + 1, kind.name()));
        log::info!("[{}/{}] {}: {}", index + 1, total, kind, step.describe());

        let applied = transformer.apply(step, &current, &output).and_then(|()| {
            if output.is_file() {
                Ok(())
            } else {
                Err(BackendError::MissingOutput(output.clone()))
            }
        });

        if let Err(source) = applied {
            discard(&output);
            log::error!("Step {} failed for {:?}: {}", kind, asset.path, source);
            return Err(PipelineError::TransformFailure { step: kind, source });
        }

        if current_is_intermediate {
            discard(&current);
        }
        current = output;
        current_is_intermediate = true;
    }

    verify_canonical(&current)?;

    publish(&current, destination)?;
    log::info!("Enhanced asset written to {:?}", destination);

    Ok(AudioAsset::new(asset.id.clone(), destination)?)
}

/// Reject a decodable output whose rate or layout is not canonical
fn verify_canonical(path: &Path) -> Result<(), PipelineError> {
    match probe_format(path) {
        Ok(format)
            if format.sample_rate == CANONICAL_SAMPLE_RATE
                && format.channels == CANONICAL_CHANNELS =>
        {
            Ok(())
        }
        Ok(format) => Err(PipelineError::TransformFailure {
            step: StepKind::NormalizeLoudness,
            source: BackendError::FormatMismatch {
                sample_rate: format.sample_rate,
                channels: format.channels,
                expected_rate: CANONICAL_SAMPLE_RATE,
                expected_channels: CANONICAL_CHANNELS,
            },
        }),
        Err(e) => {
            log::warn!(
                "Could not read format of enhanced output {:?}, left unverified: {:#}",
                path,
                e
            );
            Ok(())
        }
    }
}

/// Move `staged` to `destination`, falling back to copy + rename when the
/// two are on different filesystems. `destination` never holds a partial file.
fn publish(staged: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    if fs::rename(staged, destination).is_ok() {
        return Ok(());
    }

    let mut partial: OsString = destination.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let copied = fs::copy(staged, &partial).and_then(|_| fs::rename(&partial, destination));
    if copied.is_err() {
        discard(&partial);
    }
    copied
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed intermediate {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove intermediate {:?}: {}", path, e),
    }
}
