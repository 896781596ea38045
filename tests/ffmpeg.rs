//! Runs the real enhancement chain. Skipped when no `ffmpeg` is on PATH.

use musical_enchanter::decode::{decode_first_channel, probe_format, StreamFormat};
use musical_enchanter::model::{AnalysisResult, Segments};
use musical_enchanter::transform::{enhance, FfmpegTransformer, TransformPlan};
use musical_enchanter::AudioAsset;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Quiet mono 22.05 kHz tone: nothing about it is canonical
fn write_quiet_mono(path: &Path, seconds: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..(22_050 * seconds) {
        let t = i as f32 / 22_050.0;
        let sample = ((t * 220.0 * std::f32::consts::TAU).sin() * 1_500.0) as i16;
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_real_chain_produces_canonical_audible_output() {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not found on PATH, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("quiet.wav");
    write_quiet_mono(&input, 4);
    let run_dir = dir.path().join("run");
    fs::create_dir(&run_dir).unwrap();
    let destination = dir.path().join("out").join("quiet_enhanced.wav");

    let asset = AudioAsset::new("quiet", &input).unwrap();
    let plan = TransformPlan::from_analysis(&AnalysisResult::new(96.0, 0.3, Segments::default()));
    let enhanced = enhance(
        &FfmpegTransformer::new("ffmpeg"),
        &asset,
        &plan,
        &run_dir,
        &destination,
    )
    .unwrap();

    assert_eq!(enhanced.path, destination);
    assert_eq!(
        probe_format(&destination).unwrap(),
        StreamFormat {
            sample_rate: 44_100,
            channels: 2
        }
    );
    assert_eq!(fs::read_dir(&run_dir).unwrap().count(), 0);

    let samples = decode_first_channel(&destination).unwrap();
    assert!(!samples.is_empty());
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let input_peak = 1_500.0 / 32_768.0;
    // Loudness normalization runs last: a quiet input comes out louder but
    // stays under full scale
    assert!(peak > input_peak, "peak {} not above input peak {}", peak, input_peak);
    assert!(peak < 1.0, "peak {} clipped", peak);
}
