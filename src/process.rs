//! Bounded invocation of external programs
//!
//! Analyzer scripts and ffmpeg are run as child processes. Every call has a
//! deadline: a child that outlives it is killed and reaped.

use std::io;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::runtime::Runtime;

// One current-thread runtime per worker thread, reused across calls
thread_local! {
    static RUNTIME: io::Result<Runtime> = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build();
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("program not found: {0}")]
    NotFound(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("failed waiting on {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start process runtime: {0}")]
    Runtime(String),
}

/// Run `command` to completion, capturing stdout and stderr.
///
/// stdin is closed. Returns the child's output regardless of exit status;
/// callers decide what a non-zero status means.
pub fn run_with_timeout(command: Command, timeout: Duration) -> Result<Output, ProcessError> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("Running {:?} (timeout {:?})", command, timeout);

    RUNTIME.with(|rt| match rt {
        Ok(rt) => rt.block_on(run(command.into(), program, timeout)),
        Err(e) => Err(ProcessError::Runtime(e.to_string())),
    })
}

async fn run(
    mut command: tokio::process::Command,
    program: String,
    timeout: Duration,
) -> Result<Output, ProcessError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ProcessError::NotFound(program.clone()),
        _ => ProcessError::Spawn {
            program: program.clone(),
            source,
        },
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let finished = tokio::time::timeout(timeout, async {
        let (status, stdout, stderr) =
            tokio::join!(child.wait(), read_all(stdout), read_all(stderr));
        status.map(|status| Output {
            status,
            stdout,
            stderr,
        })
    })
    .await;

    match finished {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => {
            let _ = child.kill().await;
            Err(ProcessError::Wait { program, source })
        }
        Err(_) => {
            let _ = child.kill().await;
            log::warn!("{} exceeded {:?}, killed", program, timeout);
            Err(ProcessError::TimedOut { program, timeout })
        }
    }
}

/// Last `max_lines` lines of a captured stream, lossily decoded
pub fn tail_lines(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_end(&mut buf).await;
    }
    buf
}
