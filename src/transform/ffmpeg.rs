//! ffmpeg-backed transformer
//!
//! Each step is one ffmpeg invocation with an explicit audio filter. Every
//! invocation re-asserts the canonical output format, since filters such as
//! `loudnorm` resample internally.

use super::steps::{
    CompressorSettings, LoudnessTarget, TransformStep, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE,
};
use super::traits::Transformer;
use crate::error::BackendError;
use crate::pipeline::config::FfmpegConfig;
use crate::process::{run_with_timeout, tail_lines};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const STDERR_TAIL_LINES: usize = 20;

/// Runs steps through an ffmpeg binary
pub struct FfmpegTransformer {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegTransformer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn from_config(config: &FfmpegConfig) -> Self {
        Self::new(&config.binary).with_timeout(config.timeout())
    }

    /// Bound each invocation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument list for one step
    pub fn arguments(&self, step: &TransformStep, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .iter()
            .map(OsString::from)
            .collect();

        if let TransformStep::NormalizeContainer {
            demux_hint: Some(hint),
        } = step
        {
            args.push("-f".into());
            args.push((*hint).into());
        }

        args.push("-i".into());
        args.push(input.into());
        args.push("-vn".into());

        if let Some(filter) = audio_filter(step) {
            args.push("-af".into());
            args.push(filter.into());
        }

        for arg in [
            "-ar".to_string(),
            CANONICAL_SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            CANONICAL_CHANNELS.to_string(),
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
            "-f".to_string(),
            "wav".to_string(),
        ] {
            args.push(arg.into());
        }
        args.push(output.into());
        args
    }
}

impl Transformer for FfmpegTransformer {
    fn apply(&self, step: &TransformStep, input: &Path, output: &Path) -> Result<(), BackendError> {
        let mut command = Command::new(&self.binary);
        command.args(self.arguments(step, input, output));

        let result = run_with_timeout(command, self.timeout)?;
        if !result.status.success() {
            return Err(BackendError::Failed {
                program: self.binary.display().to_string(),
                status: result.status.to_string(),
                stderr: tail_lines(&result.stderr, STDERR_TAIL_LINES),
            });
        }

        if !output.is_file() {
            return Err(BackendError::MissingOutput(output.to_path_buf()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// ffmpeg `-af` expression for a step (container normalization has none)
pub fn audio_filter(step: &TransformStep) -> Option<String> {
    match step {
        TransformStep::NormalizeContainer { .. } => None,
        TransformStep::AdjustTempo { ratio } => Some(format!("atempo={:.6}", ratio)),
        TransformStep::EnhanceBass {
            center_hz,
            width_octaves,
            gain_db,
        } => Some(format!(
            "equalizer=f={}:width_type=o:width={}:g={}",
            center_hz, width_octaves, gain_db
        )),
        TransformStep::Compress(settings) => Some(compand_filter(settings)),
        TransformStep::NormalizeLoudness(target) => Some(loudnorm_filter(target)),
    }
}

fn compand_filter(settings: &CompressorSettings) -> String {
    let points = settings
        .points
        .iter()
        .map(|(input, output)| format!("{}/{}", input, output))
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "compand=attacks={}:decays={}:points={}:soft-knee={}:gain=0:volume=0:delay=0",
        settings.attack_secs, settings.release_secs, points, settings.soft_knee_db
    )
}

fn loudnorm_filter(target: &LoudnessTarget) -> String {
    format!(
        "loudnorm=I={}:LRA={}:TP={}",
        target.integrated_lufs, target.range_lu, target.true_peak_dbtp
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessError;

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            audio_filter(&TransformStep::AdjustTempo { ratio: 0.9375 }).unwrap(),
            "atempo=0.937500"
        );
        assert_eq!(
            audio_filter(&TransformStep::EnhanceBass {
                center_hz: 100.0,
                width_octaves: 2.0,
                gain_db: 6.0
            })
            .unwrap(),
            "equalizer=f=100:width_type=o:width=2:g=6"
        );
        assert_eq!(
            audio_filter(&TransformStep::Compress(CompressorSettings::default())).unwrap(),
            "compand=attacks=0:decays=1:points=-90/-90|-70/-70|-30/-9|0/-3:soft-knee=6:gain=0:volume=0:delay=0"
        );
        assert_eq!(
            audio_filter(&TransformStep::NormalizeLoudness(LoudnessTarget::default())).unwrap(),
            "loudnorm=I=-14:LRA=11:TP=-1"
        );
        assert!(audio_filter(&TransformStep::NormalizeContainer { demux_hint: None }).is_none());
    }

    #[test]
    fn test_every_step_writes_canonical_pcm() {
        let ffmpeg = FfmpegTransformer::new("ffmpeg");
        let step = TransformStep::NormalizeLoudness(LoudnessTarget::default());
        let args = as_strings(&ffmpeg.arguments(&step, Path::new("in.wav"), Path::new("out.wav")));

        let tail = &args[args.len() - 9..];
        assert_eq!(
            tail,
            ["-ar", "44100", "-ac", "2", "-c:a", "pcm_s16le", "-f", "wav", "out.wav"]
        );
        assert!(args.windows(2).any(|w| w[0] == "-af" && w[1].starts_with("loudnorm")));
    }

    #[test]
    fn test_demux_hint_precedes_input() {
        let ffmpeg = FfmpegTransformer::new("ffmpeg");
        let step = TransformStep::NormalizeContainer {
            demux_hint: Some("mp4"),
        };
        let args = as_strings(&ffmpeg.arguments(&step, Path::new("in.m4a"), Path::new("out.wav")));
        let hint = args.iter().position(|a| a == "mp4").unwrap();
        let input = args.iter().position(|a| a == "in.m4a").unwrap();
        assert_eq!(args[hint - 1], "-f");
        assert_eq!(hint + 2, input);
        assert!(!args.contains(&"-af".to_string()));
    }

    #[test]
    fn test_missing_binary_fails_step() {
        let ffmpeg = FfmpegTransformer::new("musical-enchanter-no-ffmpeg");
        let step = TransformStep::AdjustTempo { ratio: 1.0 };
        let err = ffmpeg
            .apply(&step, Path::new("in.wav"), Path::new("out.wav"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Process(ProcessError::NotFound(_))));
    }

    #[cfg(unix)]
    mod fake_binary {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Stand-in ffmpeg: `body` runs with the output path in `$last`
        fn install(dir: &TempDir, body: &str) -> FfmpegTransformer {
            let path = dir.path().join("fake-ffmpeg");
            let script = format!(
                "#!/bin/sh\nfor last; do :; done\nprintf '%s\\n' \"$@\" > \"{}\"\n{}\n",
                dir.path().join("args.txt").display(),
                body
            );
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            FfmpegTransformer::new(&path).with_timeout(Duration::from_secs(10))
        }

        #[test]
        fn test_successful_step() {
            let dir = TempDir::new().unwrap();
            let ffmpeg = install(&dir, "printf RIFF > \"$last\"");
            let output = dir.path().join("out.wav");
            let step = TransformStep::NormalizeLoudness(LoudnessTarget::default());

            ffmpeg.apply(&step, Path::new("in.wav"), &output).unwrap();

            assert_eq!(fs::read(&output).unwrap(), b"RIFF");
            let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
            let args: Vec<&str> = args.lines().collect();
            assert_eq!(args.last().copied(), output.to_str());
            assert!(args.contains(&"loudnorm=I=-14:LRA=11:TP=-1"));
        }

        #[test]
        fn test_exit_zero_without_output_is_missing_output() {
            let dir = TempDir::new().unwrap();
            let ffmpeg = install(&dir, "exit 0");
            let output = dir.path().join("out.wav");

            let err = ffmpeg
                .apply(&TransformStep::AdjustTempo { ratio: 1.1 }, Path::new("in.wav"), &output)
                .unwrap_err();
            assert!(matches!(err, BackendError::MissingOutput(ref p) if *p == output));
        }

        #[test]
        fn test_failing_step_carries_stderr() {
            let dir = TempDir::new().unwrap();
            let ffmpeg = install(&dir, "echo 'Invalid data found' >&2; exit 1");

            let err = ffmpeg
                .apply(
                    &TransformStep::Compress(CompressorSettings::default()),
                    Path::new("in.wav"),
                    &dir.path().join("out.wav"),
                )
                .unwrap_err();
            assert!(matches!(
                err,
                BackendError::Failed { ref stderr, .. } if stderr == "Invalid data found"
            ));
        }
    }
}
