//! Per-asset pipeline orchestration

use super::config::PipelineConfig;
use super::workspace::Workspace;
use crate::analysis::{analyze_or_synthesize, synthesize, Analyzer};
use crate::error::PipelineError;
use crate::model::{AudioAsset, ProcessingResult, Waveforms};
use crate::score::score;
use crate::transform::{enhance, TransformPlan, Transformer};
use crate::waveform::summarize;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use uuid::Uuid;

/// Main processing pipeline
///
/// Holds no per-run state: every call to [`Pipeline::process`] gets its own
/// run id and scratch directory, so calls may overlap freely.
pub struct Pipeline<A: Analyzer, T: Transformer> {
    config: PipelineConfig,
    workspace: Workspace,
    analyzer: A,
    transformer: T,
    pool: rayon::ThreadPool,
}

impl<A: Analyzer, T: Transformer> Pipeline<A, T> {
    /// Create a new pipeline
    pub fn new(config: PipelineConfig, analyzer: A, transformer: T) -> Result<Self, PipelineError> {
        let workspace = Workspace::new(config.output_dir.clone(), config.work_dir.clone());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.resolve_workers())
            .thread_name(|i| format!("enchanter-{}", i))
            .build()?;

        log::debug!(
            "Pipeline: analyzer `{}`, transformer `{}`, {} workers",
            analyzer.name(),
            transformer.name(),
            pool.current_num_threads()
        );

        Ok(Self {
            config,
            workspace,
            analyzer,
            transformer,
            pool,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Run the full pipeline for one asset
    ///
    /// Returns either a complete result or an error; nothing is published
    /// unless every transform step succeeded.
    pub fn process(&self, asset: &AudioAsset) -> Result<ProcessingResult, PipelineError> {
        if !asset.exists() {
            log::error!("Asset {} not found at {:?}", asset.id, asset.path);
            return Err(PipelineError::AssetNotFound(asset.path.clone()));
        }

        let run_id = Uuid::new_v4();
        log::info!("Processing {} ({:?}), run {}", asset.id, asset.path, run_id);

        // Analysis overlaps with workspace setup but is resolved before any
        // transform starts.
        let (analysis, run_dir) = thread::scope(|s| {
            let pending = s.spawn(|| analyze_or_synthesize(&self.analyzer, asset));
            let run_dir = self.workspace.create_run_dir(&asset.id, &run_id);
            let analysis = pending.join().unwrap_or_else(|_| {
                log::error!("Analyzer panicked for {}; using SYNTHESIZED features", asset.id);
                synthesize(&mut rand::rng())
            });
            (analysis, run_dir)
        });
        let run_dir = run_dir?;

        let plan = TransformPlan::from_analysis(&analysis);
        log::debug!(
            "Plan for {}: tempo ratio {:.3}, bass +{} dB",
            asset.id,
            plan.tempo_ratio,
            plan.bass_gain_db
        );

        let destination = self.workspace.enhanced_path(&asset.id);
        let enhanced = enhance(&self.transformer, asset, &plan, run_dir.path(), &destination)?;

        if let Err(e) = run_dir.close() {
            log::warn!("Failed to remove run directory for {}: {}", asset.id, e);
        }

        let points = self.config.waveform_points;
        let (before, after) = rayon::join(
            || summarize(&asset.path, points),
            || summarize(&enhanced.path, points),
        );

        let viral_score = score(&analysis);
        let result = ProcessingResult::assemble(
            run_id.to_string(),
            asset.clone(),
            enhanced,
            &analysis,
            plan,
            Waveforms { before, after },
            viral_score,
        );

        log::info!(
            "Completed {}: viral score {}, enhancement {}",
            asset.id,
            viral_score,
            result.metadata.enhancement_level
        );
        Ok(result)
    }

    /// Process several assets on the worker pool
    ///
    /// Outcomes are returned in input order; one asset failing does not
    /// affect the others. Assets whose output path was already claimed by an
    /// earlier asset in the batch fail with [`PipelineError::DuplicateOutput`]
    /// without running.
    pub fn process_batch(&self, assets: &[AudioAsset]) -> Vec<Result<ProcessingResult, PipelineError>> {
        log::info!(
            "Processing {} assets with {} workers",
            assets.len(),
            self.pool.current_num_threads()
        );

        let mut claimed = HashSet::new();
        let duplicates: Vec<Option<PathBuf>> = assets
            .iter()
            .map(|asset| {
                let path = self.workspace.enhanced_path(&asset.id);
                if claimed.insert(path.clone()) {
                    None
                } else {
                    Some(path)
                }
            })
            .collect();

        self.pool.install(|| {
            assets
                .par_iter()
                .zip(duplicates.par_iter())
                .map(|(asset, duplicate)| match duplicate {
                    Some(path) => {
                        log::error!(
                            "Skipping {} ({:?}): output {:?} already claimed",
                            asset.id,
                            asset.path,
                            path
                        );
                        Err(PipelineError::DuplicateOutput {
                            id: asset.id.clone(),
                            path: path.clone(),
                        })
                    }
                    None => self.process(asset),
                })
                .collect()
        })
    }
}
