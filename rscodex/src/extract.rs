//! Turning raw CLI output into caller-facing results.

use crate::errors::Error;
use crate::response::{CommandResult, GeneratedResult};
use crate::runner::RawOutcome;

const FENCE: &str = "```";

/// True when the text after an opening fence is a language tag such as
/// `python` or `c++`. Comment lines like `# header` are code.
fn is_language_tag(info: &str) -> bool {
    let info = info.trim();
    !info.is_empty() && !info.starts_with('#') && !info.contains(char::is_whitespace)
}

/// Splits `raw` into the first fenced block and the prose around it.
///
/// A language tag on the opening fence line is dropped; anything else on
/// that line stays as the first line of code. Without a complete fence the
/// whole input is returned as prose, untouched. With one, the code is
/// trimmed and the prose is the trimmed text before the fence joined to the
/// trimmed text after it.
#[must_use]
pub fn split_fenced(raw: &str) -> (String, String) {
    let Some(open) = raw.find(FENCE) else {
        return (String::new(), raw.to_string());
    };

    let after_open = &raw[open + FENCE.len()..];
    let Some(line_end) = after_open.find('\n') else {
        return (String::new(), raw.to_string());
    };
    let body = if is_language_tag(&after_open[..line_end]) {
        &after_open[line_end + 1..]
    } else {
        after_open
    };

    let Some(close) = body.find(FENCE) else {
        return (String::new(), raw.to_string());
    };

    let code = body[..close].trim().to_string();
    let before = raw[..open].trim();
    let after = body[close + FENCE.len()..].trim();

    let text = match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (false, true) => before.to_string(),
        (true, false) => after.to_string(),
        (false, false) => format!("{before}\n\n{after}"),
    };

    (code, text)
}

/// Builds a [`GeneratedResult`] from a finished run.
///
/// The capture file is preferred over stdout. A non-zero exit still counts
/// as success when the run produced usable text; stderr always lands in
/// `log`. The answer is taken as plain text, never parsed as JSON.
///
/// # Errors
///
/// [`Error::ExecutionFailed`] for a non-zero exit without usable text, and
/// [`Error::EmptyOutput`] for a clean exit without any text.
pub fn extract_generated(outcome: &RawOutcome) -> Result<GeneratedResult, Error> {
    let source = outcome
        .captured
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(&outcome.stdout);

    let (code, text) = if source.trim().is_empty() {
        (String::new(), String::new())
    } else {
        split_fenced(source)
    };

    // An empty fence counts as no output at all.
    if code.is_empty() && text.trim().is_empty() {
        return Err(if outcome.exit_code == 0 {
            Error::EmptyOutput {
                stderr: outcome.stderr.clone(),
            }
        } else {
            Error::ExecutionFailed {
                exit_code: outcome.exit_code,
                stdout: outcome.stdout.clone(),
                stderr: outcome.stderr.clone(),
            }
        });
    }

    Ok(GeneratedResult {
        code,
        text,
        log: outcome.stderr.clone(),
    })
}

/// Builds a [`CommandResult`] from a finished shell run. Nothing is trimmed.
#[must_use]
pub fn extract_command(outcome: RawOutcome) -> CommandResult {
    CommandResult {
        output: outcome.stdout,
        error: outcome.stderr,
        status_code: outcome.exit_code,
    }
}
