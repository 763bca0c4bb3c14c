//! Result values handed back to callers.

use serde::{Deserialize, Serialize};

/// Outcome of generate, explain and edit.
///
/// `code` holds the first fenced block of the agent's answer, `text` the
/// prose around it. At least one of them is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedResult {
    /// Contents of the first fenced code block, trimmed. Empty if none.
    pub code: String,
    /// Explanatory prose outside the code block.
    pub text: String,
    /// The CLI's stderr, kept verbatim for debugging.
    pub log: String,
}

impl GeneratedResult {
    /// The code if there is any, otherwise the prose.
    #[must_use]
    pub fn best(&self) -> &str {
        if self.code.is_empty() {
            &self.text
        } else {
            &self.code
        }
    }
}

/// Outcome of a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Captured stdout.
    pub output: String,
    /// Captured stderr.
    pub error: String,
    /// Process exit code.
    pub status_code: i32,
}

impl CommandResult {
    /// Zero exit status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code == 0
    }
}

/// What happened to an `exec_command` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The command ran and exited zero.
    Completed(CommandResult),
    /// The approval gate declined; nothing was spawned.
    Cancelled,
}

impl ExecOutcome {
    /// `true` when the approval gate declined.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The command result, if the command ran.
    #[must_use]
    pub fn completed(self) -> Option<CommandResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled => None,
        }
    }
}
