//! Subprocess execution and lifecycle management.

use crate::errors::Error;
use crate::invocation::Invocation;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Per-stream capture bound.
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024; // 10 MB
const GRACE_PERIOD: Duration = Duration::from_secs(5);
const PARTIAL_OUTPUT_WAIT: Duration = Duration::from_secs(1);
const READ_CHUNK: usize = 8 * 1024;

/// Everything a finished child left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutcome {
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Exit code (`-1` if the child was killed by a signal).
    pub exit_code: i32,
    /// Contents of the capture file, when one was requested and written.
    pub captured: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Runs one [`Invocation`] to completion.
///
/// Implementations take the invocation by value so the capture file is
/// released when the run ends, however it ends.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawns the child, feeds stdin, waits, and collects the outcome.
    ///
    /// # Errors
    ///
    /// Launch failures, timeouts, truncated output and pipe errors.
    async fn run(&self, invocation: Invocation) -> Result<RawOutcome, Error>;
}

/// Runs invocations as real child processes via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(&self, mut invocation: Invocation) -> Result<RawOutcome, Error> {
        let capture = invocation.capture.take();
        let mut outcome = run_process(&invocation).await?;

        if let Some(capture) = capture {
            outcome.captured = read_capture(capture.path()).await;
            if let Err(e) = capture.close() {
                warn!(error = %e, "failed to remove capture file");
            }
        }

        Ok(outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Collected bytes and whether the bound was hit.
type StreamOutput = (Stream, Vec<u8>, bool);

/// Stdout bytes, stderr bytes, and exit status.
type CollectedOutput = (Vec<u8>, Vec<u8>, std::process::ExitStatus);

/// Spawns the invocation's program and collects its output.
///
/// # Errors
/// Returns an [`Error`] if the process cannot be spawned, times out,
/// produces truncated output, or a pipe fails.
pub async fn run_process(invocation: &Invocation) -> Result<RawOutcome, Error> {
    debug!(
        kind = invocation.kind.as_str(),
        command = %invocation.command_line(),
        "spawning child process"
    );
    let start_time = Instant::now();

    let mut child = spawn_child(invocation)?;

    let stdout = child.stdout.take().ok_or(Error::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(Error::MissingPipe("stderr"))?;
    let pid = child.id().ok_or(Error::MissingPipe("pid"))?;

    let mut tasks = JoinSet::new();
    tasks.spawn(async move { drain_stream_bounded(stdout, Stream::Stdout).await });
    tasks.spawn(async move { drain_stream_bounded(stderr, Stream::Stderr).await });

    if let (Some(mut pipe), Some(payload)) = (child.stdin.take(), invocation.stdin.clone()) {
        tokio::spawn(async move {
            // A child that exits without reading its input closes the pipe
            // early; that is its business, not a failure of the run.
            if let Err(e) = pipe.write_all(payload.as_bytes()).await {
                debug!(error = %e, "child stopped reading stdin");
            }
            drop(pipe);
        });
    }

    let process_result = timeout(invocation.timeout, collect_output(&mut child, &mut tasks)).await;
    let duration = start_time.elapsed();

    match process_result {
        Ok(Ok((stdout, stderr, status))) => {
            let outcome = RawOutcome {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                exit_code: status.code().unwrap_or(-1),
                captured: None,
                duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            };
            debug!(
                exit_code = outcome.exit_code,
                elapsed_ms = outcome.duration_ms,
                "child process exited"
            );
            Ok(outcome)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => {
            warn!(pid, timeout = ?invocation.timeout, "child process timed out; terminating");
            if let Err(e) = graceful_shutdown(&mut child, pid).await {
                warn!(error = %e, "graceful shutdown failed");
            }
            let (partial_stdout, partial_stderr) = collect_partial(&mut tasks).await;

            Err(Error::Timeout {
                elapsed: duration,
                pid,
                partial_stdout,
                partial_stderr,
            })
        }
    }
}

/// Spawns the child with piped stdout/stderr and, if needed, stdin.
fn spawn_child(invocation: &Invocation) -> Result<Child, Error> {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if invocation.stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }

    cmd.spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::BinaryNotFound(format!("{}: {source}", invocation.program.display()))
        } else {
            Error::LaunchFailed {
                program: invocation.program.clone(),
                source,
            }
        }
    })
}

/// Waits for both reader tasks and then the child.
///
/// Both readers always run to EOF, so a truncation error still carries
/// everything kept from either stream.
async fn collect_output(
    child: &mut Child,
    tasks: &mut JoinSet<StreamOutput>,
) -> Result<CollectedOutput, Error> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut truncated_at = None;

    while let Some(result) = tasks.join_next().await {
        let (stream, bytes, truncated) = result.map_err(|e| Error::Io {
            stage: "join reader task",
            source: std::io::Error::other(e),
        })?;

        if truncated {
            warn!(stream = stream.as_str(), limit_bytes = MAX_OUTPUT_BYTES, "output exceeded capture bound");
            truncated_at.get_or_insert(bytes.len());
        }

        match stream {
            Stream::Stdout => stdout = bytes,
            Stream::Stderr => stderr = bytes,
        }
    }

    let status = child.wait().await.map_err(|source| Error::Io {
        stage: "wait",
        source,
    })?;

    if let Some(captured_bytes) = truncated_at {
        return Err(Error::OutputTruncated {
            captured_bytes,
            limit_bytes: MAX_OUTPUT_BYTES,
            partial_stdout: String::from_utf8_lossy(&stdout).into_owned(),
            partial_stderr: String::from_utf8_lossy(&stderr).into_owned(),
        });
    }

    Ok((stdout, stderr, status))
}

/// Gathers whatever the readers saw before the child was killed.
///
/// Readers whose pipe is still held open (e.g. by a grandchild) are
/// abandoned after a short wait.
async fn collect_partial(tasks: &mut JoinSet<StreamOutput>) -> (String, String) {
    let mut stdout = String::new();
    let mut stderr = String::new();

    let _ = timeout(PARTIAL_OUTPUT_WAIT, async {
        while let Some(Ok((stream, bytes, _))) = tasks.join_next().await {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            match stream {
                Stream::Stdout => stdout = text,
                Stream::Stderr => stderr = text,
            }
        }
    })
    .await;

    tasks.abort_all();
    (stdout, stderr)
}

/// Reads a stream to EOF, keeping at most [`MAX_OUTPUT_BYTES`].
async fn drain_stream_bounded(mut stream: impl AsyncRead + Unpin, which: Stream) -> StreamOutput {
    let mut collected = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if collected.len() + n <= MAX_OUTPUT_BYTES {
                    collected.extend_from_slice(&chunk[..n]);
                } else {
                    truncated = true;
                }
            }
            Err(e) => {
                debug!(stream = which.as_str(), error = %e, "read failed; treating as EOF");
                break;
            }
        }
    }

    (which, collected, truncated)
}

/// Reads the capture file; absent or blank files yield `None`.
async fn read_capture(path: &Path) -> Option<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            if text.trim().is_empty() {
                debug!(path = %path.display(), "capture file is empty");
                None
            } else {
                Some(text)
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read capture file; falling back to stdout");
            None
        }
    }
}

/// Graceful shutdown: `SIGTERM`, wait grace period, then `SIGKILL`.
#[cfg(unix)]
async fn graceful_shutdown(child: &mut Child, pid: u32) -> Result<(), Error> {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let raw_pid = i32::try_from(pid).map_err(|_| Error::Io {
        stage: "SIGTERM",
        source: std::io::Error::other("PID value exceeds i32::MAX"),
    })?;

    signal::kill(Pid::from_raw(raw_pid), Signal::SIGTERM).map_err(|e| Error::Io {
        stage: "SIGTERM",
        source: std::io::Error::from(e),
    })?;

    match timeout(GRACE_PERIOD, child.wait()).await {
        Ok(Ok(_status)) => Ok(()),
        Ok(Err(source)) => Err(Error::Io {
            stage: "graceful_shutdown wait",
            source,
        }),
        Err(_) => {
            child.kill().await.map_err(|source| Error::Io {
                stage: "SIGKILL",
                source,
            })?;
            Ok(())
        }
    }
}

/// Windows: immediate termination, no graceful shutdown for console processes.
#[cfg(windows)]
async fn graceful_shutdown(child: &mut Child, _pid: u32) -> Result<(), Error> {
    child.kill().await.map_err(|source| Error::Io {
        stage: "TerminateProcess",
        source,
    })
}
