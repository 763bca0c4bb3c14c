//! Command-line argument builder for headless Codex CLI invocations.
//!
//! ## Flag Reference
//!
//! - `exec`: Non-interactive mode; the prompt is read from stdin
//! - `-m, --model <model>`: Model to use (omitted to keep the CLI default)
//! - `-s, --sandbox <mode>`: Filesystem isolation (read-only | workspace-write | danger-full-access)
//! - `--color never`: Disable ANSI colouring of progress output
//! - `--skip-git-repo-check`: Allow runs outside a git checkout
//! - `--output-last-message <file>`: Write only the agent's final message to `<file>`
//!
//! The final-message file is the authoritative result channel. Stdout carries
//! progress and log lines interleaved with the answer and is only a fallback.
//!
//! ## External References
//! - [Codex CLI Reference](https://developers.openai.com/codex/cli/reference/)

use crate::types::ExecConfig;
use std::ffi::OsString;
use std::path::Path;

/// Subcommand selecting headless execution.
pub const EXEC_SUBCOMMAND: &str = "exec";

/// Flag naming the file that receives the final agent message.
pub const OUTPUT_LAST_MESSAGE_FLAG: &str = "--output-last-message";

/// Builds the argument list for a `codex exec` invocation.
///
/// `capture_path` is where the CLI writes its final message.
#[must_use]
pub fn build_exec_args(config: &ExecConfig, capture_path: &Path) -> Vec<OsString> {
    let mut args = Vec::new();

    args.push(OsString::from(EXEC_SUBCOMMAND));

    if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
        args.push(OsString::from("--model"));
        args.push(OsString::from(model));
    }

    if config.plain_output {
        args.push(OsString::from("--color"));
        args.push(OsString::from("never"));
    }

    if config.skip_git_repo_check {
        args.push(OsString::from("--skip-git-repo-check"));
    }

    if let Some(sandbox) = config.sandbox {
        args.push(OsString::from("--sandbox"));
        args.push(OsString::from(sandbox.as_str()));
    }

    args.push(OsString::from(OUTPUT_LAST_MESSAGE_FLAG));
    args.push(capture_path.as_os_str().to_owned());

    args
}
