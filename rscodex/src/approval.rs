//! The approval gate in front of shell execution.
//!
//! A safe `exec_command` call asks an [`Approver`] before anything is
//! spawned. The default asks on the terminal; tests and embedding programs
//! plug in their own.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn};

/// When set to `1`, the terminal approver declines without prompting.
pub const NONINTERACTIVE_ENV_VAR: &str = "RSCODEX_NONINTERACTIVE";

/// Decides whether a shell command may run.
pub trait Approver: Send + Sync {
    /// `true` to run `command`, `false` to cancel it.
    fn approve(&self, command: &str) -> bool;
}

impl<F> Approver for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn approve(&self, command: &str) -> bool {
        self(command)
    }
}

/// Asks `Execute command: <cmd> [y/N]` on the controlling terminal.
///
/// Only `y` or `yes` (any case) approve. End of input, read errors and
/// non-interactive mode all decline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalApprover;

impl TerminalApprover {
    /// Runs the prompt against the given streams.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the prompt or reading the answer fails.
    pub fn approve_with_io<R: BufRead, W: Write>(
        &self,
        command: &str,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<bool> {
        write!(output, "Execute command: {command} [y/N]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        let answer = line.trim().to_ascii_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }
}

impl Approver for TerminalApprover {
    fn approve(&self, command: &str) -> bool {
        if is_noninteractive() {
            info!(command, "non-interactive mode; declining command");
            return false;
        }

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        self.approve_with_io(command, &mut input, &mut output)
            .unwrap_or_else(|e| {
                warn!(error = %e, "approval prompt failed; declining command");
                false
            })
    }
}

/// Approves everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&self, _command: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Approver for DenyAll {
    fn approve(&self, _command: &str) -> bool {
        false
    }
}

fn is_noninteractive() -> bool {
    std::env::var(NONINTERACTIVE_ENV_VAR).is_ok_and(|v| v.trim() == "1")
}

/// Consults `approver` off the async executor, since it may block on stdin.
pub(crate) async fn request_approval(approver: Arc<dyn Approver>, command: String) -> bool {
    let decision = tokio::task::spawn_blocking(move || approver.approve(&command)).await;
    match decision {
        Ok(approved) => {
            info!(approved, "approval decision");
            approved
        }
        Err(e) => {
            warn!(error = %e, "approval task failed; declining command");
            false
        }
    }
}
