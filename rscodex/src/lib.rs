//! # rscodex
//!
//! One stable async API over CLI coding agents.
//!
//! A [`Coder`] binds one backend (currently `codex`, with `gemini` as a
//! placeholder) to a configuration resolved once from explicit options,
//! `RSCODEX_*` environment variables and `~/.rscodex/config.toml`. It
//! exposes four operations:
//!
//! - [`Coder::generate`], [`Coder::explain`] and [`Coder::edit`] run the
//!   agent headlessly and split its final message into code and prose
//!   ([`GeneratedResult`]).
//! - [`Coder::exec_command`] runs a shell command, behind an approval gate
//!   when asked to ([`ExecOutcome`]).
//!
//! ## Example
//!
//! ```no_run
//! use rscodex::{Coder, ExecOutcome};
//!
//! # async fn example() -> Result<(), rscodex::Error> {
//! let coder = Coder::new("codex")?;
//!
//! let fixed = coder
//!     .edit("def add(a, b):\n    return a", "Fix to return a + b", &[])
//!     .await?;
//! println!("{}", fixed.code);
//!
//! match coder.exec_command("ls -la", true).await? {
//!     ExecOutcome::Completed(result) => print!("{}", result.output),
//!     ExecOutcome::Cancelled => println!("not run"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

#![deny(missing_docs)]

/// The approval gate in front of shell execution.
pub mod approval;
/// The backend trait and its shared pipeline.
pub mod backend;
/// Concrete backends.
pub mod backends;
/// The `Coder` facade and its builder.
pub mod coder;
/// Configuration resolution.
pub mod config;
/// Public error types.
pub mod errors;
/// Output parsing.
pub mod extract;
/// Child-process invocations.
pub mod invocation;
/// Prompt templates.
pub mod prompts;
/// Operation requests.
pub mod request;
/// Result types.
pub mod response;
/// Subprocess execution.
pub mod runner;

pub use approval::{Approver, AutoApprove, DenyAll, TerminalApprover};
pub use backend::Backend;
pub use codex_adapter::SandboxMode;
pub use coder::{Coder, CoderBuilder};
pub use config::{ApprovalMode, BackendConfig, BackendKind, ConfigDocument, Overrides};
pub use errors::Error;
pub use request::{OperationKind, OperationRequest};
pub use response::{CommandResult, ExecOutcome, GeneratedResult};
pub use runner::{ProcessRunner, RawOutcome, SubprocessRunner};
