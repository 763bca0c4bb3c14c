//! The caller-facing facade.

use crate::approval::{Approver, TerminalApprover};
use crate::backend::Backend;
use crate::backends::{CodexBackend, GeminiBackend};
use crate::config::{resolve_with, ApprovalMode, BackendConfig, BackendKind, ConfigDocument, Overrides};
use crate::errors::Error;
use crate::response::{ExecOutcome, GeneratedResult};
use crate::runner::{ProcessRunner, SubprocessRunner};
use codex_adapter::SandboxMode;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One backend, one resolved configuration, four operations.
///
/// Construction resolves configuration once; a `Coder` never re-reads the
/// environment or the config document afterwards. Each operation spawns at
/// most one child process and returns when it has exited.
///
/// ```no_run
/// # async fn demo() -> Result<(), rscodex::Error> {
/// let coder = rscodex::Coder::new("codex")?;
/// let result = coder.generate("Write a Python add(a, b) function", &[]).await?;
/// println!("{}", result.best());
/// # Ok(())
/// # }
/// ```
pub struct Coder {
    backend: Box<dyn Backend>,
}

impl Coder {
    /// Creates a facade for `backend` with configuration from the
    /// environment and the config document.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedBackend`] for an unknown name, [`Error::Config`]
    /// for unusable configuration.
    pub fn new(backend: &str) -> Result<Self, Error> {
        Self::builder(backend).build()
    }

    /// Creates a facade with explicit model and approval mode overrides.
    ///
    /// # Errors
    ///
    /// Same as [`Coder::new`].
    pub fn with_options(
        backend: &str,
        model: Option<&str>,
        approval: Option<ApprovalMode>,
    ) -> Result<Self, Error> {
        let mut builder = Self::builder(backend);
        if let Some(model) = model {
            builder = builder.model(model);
        }
        if let Some(approval) = approval {
            builder = builder.approval_mode(approval);
        }
        builder.build()
    }

    /// Starts building a facade for `backend`.
    #[must_use]
    pub fn builder(backend: impl Into<String>) -> CoderBuilder {
        CoderBuilder::new(backend)
    }

    /// Wraps an already constructed backend.
    #[must_use]
    pub fn from_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The backend in use.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The configuration resolved at construction.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        self.backend.config()
    }

    /// Generates code for `prompt`. `context_files` are handed to the CLI
    /// as read context without being checked.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for a blank prompt (nothing is spawned),
    /// otherwise launch, execution and timeout failures.
    pub async fn generate(
        &self,
        prompt: &str,
        context_files: &[PathBuf],
    ) -> Result<GeneratedResult, Error> {
        self.backend.generate(prompt, context_files).await
    }

    /// Explains `code`.
    ///
    /// # Errors
    ///
    /// As for [`Coder::generate`].
    pub async fn explain(&self, code: &str) -> Result<GeneratedResult, Error> {
        self.backend.explain(code).await
    }

    /// Rewrites `code` following `instructions`, listing `context_files`
    /// for the CLI to read. The configured sandbox mode is passed to the CLI.
    ///
    /// # Errors
    ///
    /// As for [`Coder::generate`]; blank instructions are also rejected.
    pub async fn edit(
        &self,
        code: &str,
        instructions: &str,
        context_files: &[PathBuf],
    ) -> Result<GeneratedResult, Error> {
        self.backend.edit(code, instructions, context_files).await
    }

    /// Runs a shell command.
    ///
    /// With `safe` set and approval mode `suggest`, the approver is asked
    /// first; a refusal returns [`ExecOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// [`Error::ExecutionFailed`] on a non-zero exit, with the captured
    /// output attached, plus launch and timeout failures.
    pub async fn exec_command(&self, command: &str, safe: bool) -> Result<ExecOutcome, Error> {
        self.backend.exec_command(command, safe).await
    }

    /// Runs `<binary> --version`, returning the reported version.
    ///
    /// # Errors
    ///
    /// [`Error::BinaryNotFound`] when the CLI is not installed, or the
    /// failure of the version run.
    pub async fn check_health(&self) -> Result<String, Error> {
        self.backend.check_health().await
    }
}

impl fmt::Debug for Coder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coder")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Coder`].
///
/// Explicit settings win over `RSCODEX_*` environment variables, which win
/// over the config document.
#[must_use]
pub struct CoderBuilder {
    backend: String,
    overrides: Overrides,
    document: Option<ConfigDocument>,
    environment: Option<HashMap<String, String>>,
    runner: Option<Arc<dyn ProcessRunner>>,
    approver: Option<Arc<dyn Approver>>,
}

impl CoderBuilder {
    fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            overrides: Overrides::default(),
            document: None,
            environment: None,
            runner: None,
            approver: None,
        }
    }

    /// Model to request. An empty string counts as unset.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.overrides.model = Some(model.into());
        self
    }

    /// Approval policy for safe shell commands.
    pub fn approval_mode(mut self, mode: ApprovalMode) -> Self {
        self.overrides.approval = Some(mode);
        self
    }

    /// Sandbox mode passed to edits.
    pub fn sandbox(mut self, mode: SandboxMode) -> Self {
        self.overrides.sandbox = Some(mode);
        self
    }

    /// Binary name or path, instead of discovery on `$PATH`.
    pub fn binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.overrides.binary_path = Some(path.into());
        self
    }

    /// Time budget for each child process. Must be non-zero.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.overrides.timeout = Some(timeout);
        self
    }

    /// Uses `document` instead of reading the config file from disk.
    pub fn config_document(mut self, document: ConfigDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Resolves environment variables from `vars` instead of the process
    /// environment.
    pub fn environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Replaces the subprocess runner.
    pub fn runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Some(Arc::new(runner));
        self
    }

    /// Replaces the terminal approval prompt.
    pub fn approver(mut self, approver: impl Approver + 'static) -> Self {
        self.approver = Some(Arc::new(approver));
        self
    }

    /// Resolves configuration and constructs the facade.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedBackend`] for an unknown backend name and
    /// [`Error::Config`] for a zero timeout. Nothing is constructed on
    /// failure.
    pub fn build(self) -> Result<Coder, Error> {
        let kind = BackendKind::from_name(&self.backend)?;
        let document = self.document.unwrap_or_else(ConfigDocument::load_default);

        let config = match &self.environment {
            Some(vars) => resolve_with(kind, &self.overrides, |key| vars.get(key).cloned(), &document),
            None => resolve_with(kind, &self.overrides, |key| std::env::var(key).ok(), &document),
        };

        if config.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }

        let runner: Arc<dyn ProcessRunner> = match self.runner {
            Some(runner) => runner,
            None => Arc::new(SubprocessRunner),
        };
        let approver: Arc<dyn Approver> = match self.approver {
            Some(approver) => approver,
            None => Arc::new(TerminalApprover),
        };

        info!(
            backend = kind.name(),
            model = %config.model,
            approval = %config.approval,
            "coder ready"
        );

        let backend: Box<dyn Backend> = match kind {
            BackendKind::Codex => Box::new(CodexBackend::new(config, runner, approver)),
            BackendKind::Gemini => Box::new(GeminiBackend::new(config, runner, approver)),
        };

        Ok(Coder { backend })
    }
}
