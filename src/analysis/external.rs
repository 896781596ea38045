//! Out-of-process analyzer
//!
//! Runs `<program> [args...] <asset path>` and reads a JSON payload from
//! stdout:
//!
//! ```json
//! {"tempo": 128.0, "energy": 0.8,
//!  "segments": {"hooks": [[15, 25]], "drops": [[30, 35]], "transitions": [[25, 30]]}}
//! ```
//!
//! Extra keys are ignored. A payload with an `error` key counts as a failed
//! analysis even if it also carries values.

use super::traits::Analyzer;
use crate::error::AnalysisUnavailable;
use crate::model::{AnalysisResult, AudioAsset, Segments};
use crate::pipeline::config::AnalyzerConfig;
use crate::process::{run_with_timeout, tail_lines};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

const STDERR_TAIL_LINES: usize = 10;

#[derive(Debug, Deserialize)]
struct Payload {
    tempo: Option<f64>,
    energy: Option<f64>,
    segments: Option<Segments>,
    error: Option<String>,
}

/// Analyzer backed by an external program
pub struct ExternalAnalyzer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalAnalyzer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(&config.program)
            .with_args(config.args.clone())
            .with_timeout(config.timeout())
    }

    /// Arguments passed before the asset path (e.g. a script path)
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Analyzer for ExternalAnalyzer {
    fn analyze(&self, asset: &AudioAsset) -> Result<AnalysisResult, AnalysisUnavailable> {
        log::debug!("Analyzing {:?} with {:?}", asset.path, self.program);

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(&asset.path);

        let output = run_with_timeout(command, self.timeout)?;
        if !output.status.success() {
            return Err(AnalysisUnavailable::Exited {
                status: output.status.to_string(),
                stderr: tail_lines(&output.stderr, STDERR_TAIL_LINES),
            });
        }

        let stderr = tail_lines(&output.stderr, STDERR_TAIL_LINES);
        if !stderr.is_empty() {
            log::debug!("Analyzer stderr for {:?}:\n{}", asset.path, stderr);
        }

        parse_payload(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "external"
    }
}

/// Parse analyzer stdout
///
/// Scripts often print progress before the payload, so if stdout as a whole
/// is not JSON the last line that parses as a JSON object is used.
pub fn parse_payload(stdout: &str) -> Result<AnalysisResult, AnalysisUnavailable> {
    let payload = match serde_json::from_str::<Payload>(stdout.trim()) {
        Ok(payload) => payload,
        Err(whole_err) => stdout
            .lines()
            .rev()
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .find_map(|line| serde_json::from_str::<Payload>(line).ok())
            .ok_or_else(|| AnalysisUnavailable::Malformed(whole_err.to_string()))?,
    };

    if let Some(error) = payload.error {
        return Err(AnalysisUnavailable::Reported(error));
    }

    let tempo = payload
        .tempo
        .ok_or_else(|| AnalysisUnavailable::Malformed("missing `tempo`".to_string()))?;
    let energy = payload
        .energy
        .ok_or_else(|| AnalysisUnavailable::Malformed("missing `energy`".to_string()))?;
    let segments = payload
        .segments
        .ok_or_else(|| AnalysisUnavailable::Malformed("missing `segments`".to_string()))?;

    let result = AnalysisResult::new(tempo, energy, segments);
    result.validate().map_err(AnalysisUnavailable::Invalid)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisOrigin, Interval};

    const PAYLOAD: &str = r#"{"tempo": 128.0, "energy": 0.8, "duration": 61.2, "beat_count": 120,
        "segments": {"hooks": [[15, 25], [45, 55]], "drops": [[30, 35]], "transitions": [[25, 30], [55, 60]]}}"#;

    #[test]
    fn test_parses_payload_and_ignores_extra_keys() {
        let result = parse_payload(PAYLOAD).unwrap();
        assert_eq!(result.tempo, 128.0);
        assert_eq!(result.energy, 0.8);
        assert_eq!(result.segments.hooks[1], Interval(45.0, 55.0));
        assert_eq!(result.segments.total_count(), 5);
        assert_eq!(result.origin, AnalysisOrigin::Measured);
    }

    #[test]
    fn test_uses_last_json_line_after_progress_output() {
        let stdout = format!(
            "Analyzing file: /tmp/x.mp3\n{}\n",
            PAYLOAD.replace('\n', " ")
        );
        assert_eq!(parse_payload(&stdout).unwrap().tempo, 128.0);
    }

    #[test]
    fn test_rejects_malformed_output() {
        assert!(matches!(
            parse_payload("not json at all"),
            Err(AnalysisUnavailable::Malformed(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"energy": 0.5, "segments": {}}"#),
            Err(AnalysisUnavailable::Malformed(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"tempo": "fast", "energy": 0.5, "segments": {}}"#),
            Err(AnalysisUnavailable::Malformed(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"tempo": 120, "energy": 3.0, "segments": {}}"#),
            Err(AnalysisUnavailable::Invalid(_))
        ));
    }

    #[test]
    fn test_error_key_counts_as_failure() {
        let stdout = r#"{"error": "File not found", "tempo": 120, "energy": 0.5, "segments": {}}"#;
        assert!(matches!(
            parse_payload(stdout),
            Err(AnalysisUnavailable::Reported(msg)) if msg == "File not found"
        ));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use crate::process::ProcessError;

        fn shell(script: &str) -> ExternalAnalyzer {
            // `sh -c script name path`: the asset path arrives as $1
            ExternalAnalyzer::new("sh")
                .with_args(vec!["-c".to_string(), script.to_string(), "analyzer".to_string()])
                .with_timeout(Duration::from_secs(5))
        }

        fn asset() -> AudioAsset {
            AudioAsset::new("a", "/tmp/a.mp3").unwrap()
        }

        #[test]
        fn test_successful_run() {
            let script = format!("echo \"analyzing $1\"; echo '{}'", PAYLOAD.replace('\n', " "));
            let result = shell(&script).analyze(&asset()).unwrap();
            assert_eq!(result.tempo, 128.0);
        }

        #[test]
        fn test_non_zero_exit() {
            let err = shell("echo boom >&2; exit 2").analyze(&asset()).unwrap_err();
            assert!(matches!(err, AnalysisUnavailable::Exited { ref stderr, .. } if stderr == "boom"));
        }

        #[test]
        fn test_timeout() {
            let analyzer = shell("sleep 5").with_timeout(Duration::from_millis(200));
            let err = analyzer.analyze(&asset()).unwrap_err();
            assert!(matches!(
                err,
                AnalysisUnavailable::Process(ProcessError::TimedOut { .. })
            ));
        }

        #[test]
        fn test_missing_program() {
            let err = ExternalAnalyzer::new("musical-enchanter-no-analyzer")
                .analyze(&asset())
                .unwrap_err();
            assert!(matches!(
                err,
                AnalysisUnavailable::Process(ProcessError::NotFound(_))
            ));
        }
    }
}
