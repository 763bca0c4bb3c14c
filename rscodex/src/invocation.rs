//! A fully built child-process invocation.
//!
//! Backends turn an [`OperationRequest`] into an [`Invocation`]; the
//! [`crate::runner::ProcessRunner`] consumes it. Shell execution is the same
//! for every backend and is built here.

use crate::config::{ApprovalMode, BackendConfig};
use crate::errors::Error;
use crate::request::{OperationKind, OperationRequest};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;

const CAPTURE_PREFIX: &str = "rscodex_last_msg_";
const CAPTURE_SUFFIX: &str = ".txt";

/// Temporary file the CLI writes its final message into.
///
/// The file is removed when this value is dropped, so every exit path of a
/// run (success, failure, timeout, launch failure) cleans it up.
#[derive(Debug)]
pub struct CaptureFile {
    path: TempPath,
}

impl CaptureFile {
    /// Creates an empty capture file in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureFile`] if the file cannot be created.
    pub fn create() -> Result<Self, Error> {
        let file = tempfile::Builder::new()
            .prefix(CAPTURE_PREFIX)
            .suffix(CAPTURE_SUFFIX)
            .tempfile()
            .map_err(|source| Error::CaptureFile {
                stage: "create",
                source,
            })?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureFile`] if removal fails.
    pub fn close(self) -> Result<(), Error> {
        self.path.close().map_err(|source| Error::CaptureFile {
            stage: "remove",
            source,
        })
    }
}

/// One child process to run.
#[derive(Debug)]
pub struct Invocation {
    /// Operation this invocation serves.
    pub kind: OperationKind,
    /// Program to spawn.
    pub program: PathBuf,
    /// Ordered argument list.
    pub args: Vec<OsString>,
    /// Text written to the child's stdin, which is then closed.
    pub stdin: Option<String>,
    /// File the child writes its final message into.
    pub capture: Option<CaptureFile>,
    /// The approval gate must pass before spawning.
    pub requires_approval: bool,
    /// Time budget for the child.
    pub timeout: Duration,
}

impl Invocation {
    /// `true` when the run uses a capture file instead of scraping stdout.
    #[must_use]
    pub const fn needs_capture_file(&self) -> bool {
        self.capture.is_some()
    }

    /// Program and arguments as a single line, for logs and prompts.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builds the invocation for a shell command.
///
/// The command is handed to the platform shell as a single argument; stdin
/// is not used. A `safe` request needs approval unless the configured
/// approval mode already grants it.
#[must_use]
pub fn shell_invocation(request: &OperationRequest, config: &BackendConfig) -> Invocation {
    let (shell, flag) = platform_shell();
    Invocation {
        kind: OperationKind::Exec,
        program: PathBuf::from(shell),
        args: vec![OsString::from(flag), OsString::from(&request.payload)],
        stdin: None,
        capture: None,
        requires_approval: request.safe && config.approval == ApprovalMode::Suggest,
        timeout: config.timeout,
    }
}

#[cfg(unix)]
const fn platform_shell() -> (&'static str, &'static str) {
    ("sh", "-c")
}

#[cfg(windows)]
const fn platform_shell() -> (&'static str, &'static str) {
    ("cmd", "/C")
}
