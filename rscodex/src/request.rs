//! Per-call operation requests.

use crate::errors::Error;
use std::path::PathBuf;

/// The four operations every backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Produce code from a prompt.
    Generate,
    /// Describe existing code.
    Explain,
    /// Rewrite existing code per instructions.
    Edit,
    /// Run a shell command.
    Exec,
}

impl OperationKind {
    /// Lower-case name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Explain => "explain",
            Self::Edit => "edit",
            Self::Exec => "exec",
        }
    }
}

/// Everything one operation call needs. Lives only for that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Which operation to run.
    pub kind: OperationKind,
    /// Prompt, code, or shell command depending on `kind`.
    pub payload: String,
    /// Edit instructions; only meaningful for [`OperationKind::Edit`].
    pub instructions: Option<String>,
    /// Files the CLI should read for context. Passed through unchecked.
    pub context_files: Vec<PathBuf>,
    /// Whether a shell command must pass the approval gate.
    pub safe: bool,
}

impl OperationRequest {
    /// A generation request with optional context files.
    pub fn generate<I, P>(prompt: impl Into<String>, context_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            kind: OperationKind::Generate,
            payload: prompt.into(),
            instructions: None,
            context_files: context_files.into_iter().map(Into::into).collect(),
            safe: true,
        }
    }

    /// An explanation request.
    pub fn explain(code: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Explain,
            payload: code.into(),
            instructions: None,
            context_files: Vec::new(),
            safe: true,
        }
    }

    /// An edit request.
    pub fn edit(code: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Edit,
            payload: code.into(),
            instructions: Some(instructions.into()),
            context_files: Vec::new(),
            safe: true,
        }
    }

    /// Replaces the context files. Only generate and edit runs render them.
    #[must_use]
    pub fn with_context_files<I, P>(mut self, context_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.context_files = context_files.into_iter().map(Into::into).collect();
        self
    }

    /// A shell execution request.
    pub fn exec(command: impl Into<String>, safe: bool) -> Self {
        Self {
            kind: OperationKind::Exec,
            payload: command.into(),
            instructions: None,
            context_files: Vec::new(),
            safe,
        }
    }

    /// Rejects requests that would hand the CLI nothing to work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank payload, or blank
    /// instructions on an edit.
    pub fn validate(&self) -> Result<(), Error> {
        if self.payload.trim().is_empty() {
            let what = match self.kind {
                OperationKind::Generate => "prompt",
                OperationKind::Explain | OperationKind::Edit => "code",
                OperationKind::Exec => "command",
            };
            return Err(Error::InvalidInput(format!(
                "{} requires a non-empty {what}",
                self.kind.as_str()
            )));
        }

        if self.kind == OperationKind::Edit
            && self
                .instructions
                .as_deref()
                .map_or(true, |i| i.trim().is_empty())
        {
            return Err(Error::InvalidInput(
                "edit requires non-empty instructions".to_string(),
            ));
        }

        Ok(())
    }
}
