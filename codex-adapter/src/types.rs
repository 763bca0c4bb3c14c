//! Shared data types for Codex CLI invocations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filesystem isolation level passed to `codex exec --sandbox`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    /// Agent may read the workspace but not write to it.
    #[default]
    ReadOnly,
    /// Agent may write inside the working directory.
    WorkspaceWrite,
    /// No filesystem restriction at all.
    DangerFullAccess,
}

impl SandboxMode {
    /// The flag value understood by the Codex CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read-only",
            Self::WorkspaceWrite => "workspace-write",
            Self::DangerFullAccess => "danger-full-access",
        }
    }
}

impl fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SandboxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read-only" | "readonly" => Ok(Self::ReadOnly),
            "workspace-write" => Ok(Self::WorkspaceWrite),
            "danger-full-access" | "full-access" => Ok(Self::DangerFullAccess),
            other => Err(format!(
                "unknown sandbox mode '{other}' (expected read-only, workspace-write or danger-full-access)"
            )),
        }
    }
}

/// Flags for one headless `codex exec` run.
///
/// The prompt itself is not part of this config; it is written to the
/// child's stdin by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecConfig {
    /// Model to request. `None` lets the CLI pick its own default.
    pub model: Option<String>,
    /// Sandbox level. `None` omits the flag entirely.
    pub sandbox: Option<SandboxMode>,
    /// Pass `--color never` so captured output carries no ANSI escapes.
    pub plain_output: bool,
    /// Pass `--skip-git-repo-check` so runs work outside git checkouts.
    pub skip_git_repo_check: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            model: None,
            sandbox: None,
            plain_output: true,
            skip_git_repo_check: true,
        }
    }
}
