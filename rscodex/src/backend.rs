//! The capability set every backend provides.
//!
//! A backend only has to say how it finds its binary and how it spells an
//! invocation. Validation, the approval gate, running and extraction are
//! shared and live in the provided methods below.

use crate::approval::{request_approval, Approver};
use crate::config::{BackendConfig, BackendKind};
use crate::errors::Error;
use crate::extract::{extract_command, extract_generated};
use crate::invocation::Invocation;
use crate::request::{OperationKind, OperationRequest};
use crate::response::{ExecOutcome, GeneratedResult};
use crate::runner::ProcessRunner;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A concrete CLI tool behind the facade.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// The configuration resolved at construction.
    fn config(&self) -> &BackendConfig;

    /// Runner used for every child process.
    fn runner(&self) -> &dyn ProcessRunner;

    /// Approval gate consulted before safe shell commands.
    fn approver(&self) -> Arc<dyn Approver>;

    /// Resolves the configured binary to an executable path.
    ///
    /// # Errors
    ///
    /// [`Error::BinaryNotFound`] if nothing usable exists.
    fn locate(&self) -> Result<PathBuf, Error>;

    /// Builds the child invocation for a validated request.
    ///
    /// # Errors
    ///
    /// Discovery and capture-file failures.
    fn build_invocation(&self, request: &OperationRequest) -> Result<Invocation, Error>;

    /// Generates code from `prompt`, pointing the CLI at `context_files`.
    async fn generate(
        &self,
        prompt: &str,
        context_files: &[PathBuf],
    ) -> Result<GeneratedResult, Error> {
        self.run_generated(OperationRequest::generate(
            prompt,
            context_files.iter().cloned(),
        ))
        .await
    }

    /// Explains `code`.
    async fn explain(&self, code: &str) -> Result<GeneratedResult, Error> {
        self.run_generated(OperationRequest::explain(code)).await
    }

    /// Edits `code` following `instructions`, pointing the CLI at
    /// `context_files`.
    async fn edit(
        &self,
        code: &str,
        instructions: &str,
        context_files: &[PathBuf],
    ) -> Result<GeneratedResult, Error> {
        self.run_generated(
            OperationRequest::edit(code, instructions).with_context_files(context_files.iter().cloned()),
        )
        .await
    }

    /// Runs `command` in the platform shell.
    ///
    /// A declined approval yields [`ExecOutcome::Cancelled`] and spawns
    /// nothing. A non-zero exit is [`Error::ExecutionFailed`] carrying the
    /// captured output.
    async fn exec_command(&self, command: &str, safe: bool) -> Result<ExecOutcome, Error> {
        let request = OperationRequest::exec(command, safe);
        request.validate()?;

        let invocation = self.build_invocation(&request)?;
        if invocation.requires_approval
            && !request_approval(self.approver(), request.payload.clone()).await
        {
            info!(command, "command declined; nothing was run");
            return Ok(ExecOutcome::Cancelled);
        }

        let result = extract_command(self.runner().run(invocation).await?);
        if !result.is_success() {
            return Err(Error::ExecutionFailed {
                exit_code: result.status_code,
                stdout: result.output,
                stderr: result.error,
            });
        }

        Ok(ExecOutcome::Completed(result))
    }

    /// Shared pipeline for generate, explain and edit.
    async fn run_generated(&self, request: OperationRequest) -> Result<GeneratedResult, Error> {
        request.validate()?;

        let invocation = self.build_invocation(&request)?;
        debug!(
            backend = self.kind().name(),
            kind = request.kind.as_str(),
            command = %invocation.command_line(),
            capture = invocation.needs_capture_file(),
            "built invocation"
        );

        let outcome = self.runner().run(invocation).await?;
        if outcome.exit_code != 0 {
            warn!(
                exit_code = outcome.exit_code,
                kind = request.kind.as_str(),
                "CLI exited non-zero; looking for usable output"
            );
        }

        extract_generated(&outcome)
    }

    /// Runs `<binary> --version` and returns what it printed.
    ///
    /// # Errors
    ///
    /// Discovery failures, launch failures, or [`Error::ExecutionFailed`]
    /// when the binary exits non-zero.
    async fn check_health(&self) -> Result<String, Error> {
        let program = self.locate()?;
        let invocation = Invocation {
            kind: OperationKind::Exec,
            program,
            args: vec![OsString::from("--version")],
            stdin: None,
            capture: None,
            requires_approval: false,
            timeout: self.config().timeout,
        };

        let outcome = self.runner().run(invocation).await?;
        if outcome.exit_code != 0 {
            return Err(Error::ExecutionFailed {
                exit_code: outcome.exit_code,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        }

        Ok(outcome.stdout.trim().to_string())
    }
}
