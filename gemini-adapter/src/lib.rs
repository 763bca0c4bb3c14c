//! Flag vocabulary for the Gemini CLI.
//!
//! Gemini is wired as a second backend with the simplest possible contract:
//! one subcommand per operation, prompt on stdin, answer on stdout.

/// Subcommands and per-run flags for a Gemini invocation.
pub mod cmd;
/// Discovery of the Gemini CLI executable path.
pub mod discovery;
/// Error types returned by adapter operations.
pub mod error;

pub use cmd::{build_args, GeminiConfig, Subcommand};
pub use discovery::{discover_gemini, DEFAULT_GEMINI_BIN, INSTALL_HINT};
pub use error::GeminiError;
