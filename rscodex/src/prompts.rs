//! Prompt text sent to the CLI.
//!
//! The wrappers here are what distinguishes explain and edit runs from a
//! plain generate run; the argument list is the same for all three.

use crate::request::{OperationKind, OperationRequest};
use std::fmt::Write;
use std::path::PathBuf;

/// Instruction prefix for generating unit tests.
pub const UNIT_TEST_GENERATOR: &str = "You are a test generator. Given the module code and context, \
     produce comprehensive unit tests with edge cases.";

/// Instruction prefix for explaining an API from its signatures and docs.
pub const DOCSTRING_EXPLAINER: &str = "Explain the following functions and types based on their \
     signatures and documentation. Clarify purpose, parameters, return values, and examples if useful.";

/// Instruction prefix for refactoring suggestions.
pub const REFACTOR_GUIDE: &str = "Review the code and suggest refactors that improve readability, \
     performance, and maintainability. Propose concrete diffs and rationale.";

/// Prefixes `prompt` with the list of files the CLI should read.
#[must_use]
pub fn with_context_files(prompt: &str, files: &[PathBuf]) -> String {
    if files.is_empty() {
        return prompt.to_string();
    }

    let mut out = String::from("[CONTEXT FILES]\nRead these files for context before answering:\n");
    for file in files {
        let _ = writeln!(out, "- {}", file.display());
    }
    let _ = write!(out, "\n{prompt}");
    out
}

/// Wraps `code` in a request for an explanation.
#[must_use]
pub fn explain_prompt(code: &str) -> String {
    format!(
        "Explain the following code in clear terms. Include purpose, key logic, and potential issues.\n\n\
         ```\n{code}\n```\n"
    )
}

/// Wraps `code` and `instructions` in a request for the full edited code.
#[must_use]
pub fn edit_prompt(code: &str, instructions: &str) -> String {
    format!(
        "Edit the code per the instructions. Respond with the full, updated code in a fenced block.\n\n\
         [INSTRUCTIONS]\n{instructions}\n\n[CODE]\n```\n{code}\n```\n"
    )
}

/// The stdin payload for `request`.
///
/// Shell commands are passed as an argument, so for them this is just the
/// command text.
#[must_use]
pub fn compose(request: &OperationRequest) -> String {
    match request.kind {
        OperationKind::Generate => with_context_files(&request.payload, &request.context_files),
        OperationKind::Explain => explain_prompt(&request.payload),
        OperationKind::Edit => with_context_files(
            &edit_prompt(&request.payload, request.instructions.as_deref().unwrap_or_default()),
            &request.context_files,
        ),
        OperationKind::Exec => request.payload.clone(),
    }
}
