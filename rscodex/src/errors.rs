//! Public error types for rscodex.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the facade and its backends.
///
/// Variants are grouped by failure class: configuration, input validation,
/// launch, execution and timeout. Declining an approval prompt is not an
/// error; see [`crate::response::ExecOutcome::Cancelled`].
#[derive(Debug, Error)]
pub enum Error {
    /// The requested backend name has no implementation.
    #[error("Unsupported backend '{0}' (expected one of: codex, gemini)")]
    UnsupportedBackend(String),

    /// Resolved configuration cannot be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required text input was empty or otherwise unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The CLI binary could not be located.
    #[error("CLI executable not found: {0}")]
    BinaryNotFound(String),

    /// The binary exists but the OS refused to start it.
    #[error("Failed to launch '{}': {source}", program.display())]
    LaunchFailed {
        /// Program that was being spawned.
        program: PathBuf,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited non-zero without usable output.
    #[error(
        "Process exited with non-zero status: {exit_code}\nSTDOUT: {stdout}\nSTDERR: {stderr}"
    )]
    ExecutionFailed {
        /// Exit code reported by the process (`-1` when killed by a signal).
        exit_code: i32,
        /// Everything the process wrote to stdout.
        stdout: String,
        /// Everything the process wrote to stderr.
        stderr: String,
    },

    /// The process exceeded its time budget and was terminated.
    #[error("Process timed out after {elapsed:?} (PID: {pid})")]
    Timeout {
        /// Time spent before the process was killed.
        elapsed: Duration,
        /// PID of the killed process.
        pid: u32,
        /// Stdout collected before termination.
        partial_stdout: String,
        /// Stderr collected before termination.
        partial_stderr: String,
    },

    /// The process exited cleanly but wrote nothing at all.
    #[error("CLI produced no output\nSTDERR: {stderr}")]
    EmptyOutput {
        /// Diagnostic output, if any.
        stderr: String,
    },

    /// A stream exceeded the capture bound.
    #[error("Output truncated: captured {captured_bytes} bytes (limit: {limit_bytes} bytes)")]
    OutputTruncated {
        /// Bytes kept from the stream that hit the bound.
        captured_bytes: usize,
        /// Configured bound.
        limit_bytes: usize,
        /// Stdout kept up to the bound.
        partial_stdout: String,
        /// Stderr kept up to the bound.
        partial_stderr: String,
    },

    /// The temporary capture file could not be created.
    #[error("Capture file error at stage '{stage}': {source}")]
    CaptureFile {
        /// What was being attempted.
        stage: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failure talking to the child after it started.
    #[error("I/O error at stage '{stage}': {source}")]
    Io {
        /// What was being attempted.
        stage: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A child pipe that should have been captured was missing.
    #[error("Child process {0} was not captured")]
    MissingPipe(&'static str),
}

impl Error {
    /// `true` when no process output exists because the binary never ran.
    #[must_use]
    pub const fn is_launch_failure(&self) -> bool {
        matches!(self, Self::BinaryNotFound(_) | Self::LaunchFailed { .. })
    }

    /// `true` for failures detected before anything was spawned.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::UnsupportedBackend(_) | Self::Config(_))
    }

    /// Stdout and stderr attached to the failure, when there are any.
    #[must_use]
    pub fn partial_output(&self) -> Option<(&str, &str)> {
        match self {
            Self::ExecutionFailed { stdout, stderr, .. } => Some((stdout.as_str(), stderr.as_str())),
            Self::Timeout {
                partial_stdout,
                partial_stderr,
                ..
            }
            | Self::OutputTruncated {
                partial_stdout,
                partial_stderr,
                ..
            } => Some((partial_stdout.as_str(), partial_stderr.as_str())),
            Self::EmptyOutput { stderr } => Some(("", stderr.as_str())),
            _ => None,
        }
    }
}

impl From<codex_adapter::CodexError> for Error {
    fn from(error: codex_adapter::CodexError) -> Self {
        match error {
            codex_adapter::CodexError::ExecutableNotFound(msg) => Self::BinaryNotFound(msg),
        }
    }
}

impl From<gemini_adapter::GeminiError> for Error {
    fn from(error: gemini_adapter::GeminiError) -> Self {
        match error {
            gemini_adapter::GeminiError::ExecutableNotFound(msg) => Self::BinaryNotFound(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_not_found_maps_to_launch_failure() {
        let err: Error = codex_adapter::CodexError::ExecutableNotFound("codex".into()).into();
        assert!(err.is_launch_failure());
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_execution_failure_keeps_output() {
        let err = Error::ExecutionFailed {
            exit_code: 2,
            stdout: "out".into(),
            stderr: "boom".into(),
        };
        assert_eq!(err.partial_output(), Some(("out", "boom")));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_truncated_output_keeps_partial_streams() {
        let err = Error::OutputTruncated {
            captured_bytes: 3,
            limit_bytes: 3,
            partial_stdout: "abc".into(),
            partial_stderr: "warn".into(),
        };
        assert_eq!(err.partial_output(), Some(("abc", "warn")));
        assert!(!err.is_launch_failure());
    }
}
