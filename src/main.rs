use anyhow::{bail, Context, Result};
use clap::Parser;
use musical_enchanter::analysis::{Analyzer, ExternalAnalyzer, FixedAnalyzer};
use musical_enchanter::transform::FfmpegTransformer;
use musical_enchanter::{AudioAsset, Pipeline, PipelineConfig, ProcessingReport};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "musical-enchanter")]
#[command(about = "Enhance audio tracks for short-form social video", long_about = None)]
struct Args {
    /// Audio files to process
    #[arg(required = true)]
    inputs: Vec<String>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Directory for enhanced files
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Parent directory for per-run scratch space
    #[arg(long)]
    work_dir: Option<String>,

    /// Parallel runs (0 = auto)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Points per waveform envelope
    #[arg(long)]
    points: Option<usize>,

    /// Analyzer program
    #[arg(long)]
    analyzer: Option<PathBuf>,

    /// Argument passed to the analyzer before the file path (can be specified multiple times)
    #[arg(long = "analyzer-arg", allow_hyphen_values = true)]
    analyzer_args: Vec<String>,

    /// ffmpeg binary
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Skip the external analyzer and use synthesized features
    #[arg(long)]
    no_analysis: bool,

    /// Indent JSON reports
    #[arg(long)]
    pretty: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;

    let assets = args
        .inputs
        .iter()
        .map(|input| {
            let path = PathBuf::from(shellexpand::tilde(input).as_ref());
            AudioAsset::from_path(&path).with_context(|| format!("Invalid input path: {}", input))
        })
        .collect::<Result<Vec<_>>>()?;

    let transformer = FfmpegTransformer::from_config(&config.ffmpeg);

    if args.no_analysis {
        log::info!("External analysis disabled");
        run(config, FixedAnalyzer::unavailable(), transformer, &assets, args.pretty)
    } else {
        let analyzer = ExternalAnalyzer::from_config(&config.analyzer);
        run(config, analyzer, transformer, &assets, args.pretty)
    }
}

/// Config file (if any) with command-line overrides applied
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let path = PathBuf::from(shellexpand::tilde(path).as_ref());
            PipelineConfig::load(&path)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output_dir = PathBuf::from(shellexpand::tilde(output).as_ref());
    }
    if let Some(work_dir) = &args.work_dir {
        config.work_dir = PathBuf::from(shellexpand::tilde(work_dir).as_ref());
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(points) = args.points {
        config.waveform_points = points;
    }
    if let Some(program) = &args.analyzer {
        config.analyzer.program = program.clone();
    }
    if !args.analyzer_args.is_empty() {
        config.analyzer.args = args.analyzer_args.clone();
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        config.ffmpeg.binary = ffmpeg.clone();
    }

    Ok(config)
}

fn run<A: Analyzer>(
    config: PipelineConfig,
    analyzer: A,
    transformer: FfmpegTransformer,
    assets: &[AudioAsset],
    pretty: bool,
) -> Result<()> {
    log::info!("Output directory: {:?}", config.output_dir);

    let pipeline = Pipeline::new(config, analyzer, transformer)?;
    let outcomes = pipeline.process_batch(assets);

    let mut failed = 0;
    for (asset, outcome) in assets.iter().zip(outcomes) {
        let report = ProcessingReport::from_outcome(&asset.id, outcome);
        if !report.is_completed() {
            failed += 1;
        }

        let json = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{}", json);
    }

    if failed > 0 {
        bail!("{} of {} inputs failed", failed, assets.len());
    }

    log::info!("All {} inputs processed", assets.len());
    Ok(())
}
