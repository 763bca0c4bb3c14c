//! Flag vocabulary for driving the OpenAI Codex CLI headlessly.
//!
//! This crate knows how to find the `codex` binary and how to spell a
//! non-interactive `codex exec` run. Spawning and output handling live in
//! the `rscodex` facade so every backend shares one process runner.

/// Command-line argument construction for `codex exec`.
pub mod cmd;
/// Discovery and resolution of the Codex CLI executable path.
pub mod discovery;
/// Error types returned by adapter operations.
pub mod error;
/// Sandbox modes and per-run flag configuration.
pub mod types;

pub use cmd::build_exec_args;
pub use discovery::{discover_codex, DEFAULT_CODEX_BIN, INSTALL_HINT};
pub use error::CodexError;
pub use types::{ExecConfig, SandboxMode};
