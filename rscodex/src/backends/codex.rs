use crate::approval::Approver;
use crate::backend::Backend;
use crate::config::{BackendConfig, BackendKind};
use crate::errors::Error;
use crate::invocation::{shell_invocation, CaptureFile, Invocation};
use crate::prompts;
use crate::request::{OperationKind, OperationRequest};
use crate::runner::ProcessRunner;
use codex_adapter::{build_exec_args, discover_codex, ExecConfig};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Drives `codex exec` headlessly.
///
/// The prompt goes in on stdin and the final agent message comes back
/// through `--output-last-message`, so progress lines on stdout never leak
/// into the result.
pub struct CodexBackend {
    config: BackendConfig,
    runner: Arc<dyn ProcessRunner>,
    approver: Arc<dyn Approver>,
}

impl CodexBackend {
    /// Creates a backend bound to `config`.
    #[must_use]
    pub fn new(
        config: BackendConfig,
        runner: Arc<dyn ProcessRunner>,
        approver: Arc<dyn Approver>,
    ) -> Self {
        Self {
            config,
            runner,
            approver,
        }
    }

    fn exec_config(&self, kind: OperationKind) -> ExecConfig {
        ExecConfig {
            model: Some(self.config.model.clone()),
            // Only edits may write files.
            sandbox: (kind == OperationKind::Edit).then_some(self.config.sandbox),
            ..ExecConfig::default()
        }
    }
}

impl fmt::Debug for CodexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodexBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Backend for CodexBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Codex
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    fn approver(&self) -> Arc<dyn Approver> {
        Arc::clone(&self.approver)
    }

    fn locate(&self) -> Result<PathBuf, Error> {
        Ok(discover_codex(&self.config.binary_path)?)
    }

    fn build_invocation(&self, request: &OperationRequest) -> Result<Invocation, Error> {
        if request.kind == OperationKind::Exec {
            return Ok(shell_invocation(request, &self.config));
        }

        let program = self.locate()?;
        let capture = CaptureFile::create()?;
        let args = build_exec_args(&self.exec_config(request.kind), capture.path());

        Ok(Invocation {
            kind: request.kind,
            program,
            args,
            stdin: Some(prompts::compose(request)),
            capture: Some(capture),
            requires_approval: false,
            timeout: self.config.timeout,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::approval::DenyAll;
    use crate::config::{resolve_with, ConfigDocument, Overrides};
    use crate::runner::SubprocessRunner;
    use codex_adapter::SandboxMode;
    use std::ffi::OsString;

    fn backend_with_binary(binary: PathBuf) -> CodexBackend {
        let overrides = Overrides {
            binary_path: Some(binary),
            sandbox: Some(SandboxMode::WorkspaceWrite),
            ..Overrides::default()
        };
        let config = resolve_with(
            BackendKind::Codex,
            &overrides,
            |_| None,
            &ConfigDocument::default(),
        );
        CodexBackend::new(config, Arc::new(SubprocessRunner), Arc::new(DenyAll))
    }

    fn args_of(invocation: &Invocation) -> Vec<String> {
        invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_generate_uses_capture_file_and_stdin() {
        let fake = tempfile::NamedTempFile::new().unwrap();
        let backend = backend_with_binary(fake.path().to_path_buf());

        let request = OperationRequest::generate("Write add(a, b)", Vec::<PathBuf>::new());
        let invocation = backend.build_invocation(&request).unwrap();

        assert_eq!(invocation.program, fake.path());
        assert_eq!(invocation.stdin.as_deref(), Some("Write add(a, b)"));
        let capture = invocation.capture.as_ref().unwrap().path().to_path_buf();
        assert_eq!(
            invocation.args.last(),
            Some(&OsString::from(capture.as_os_str()))
        );

        let args = args_of(&invocation);
        assert_eq!(args[0], "exec");
        assert!(args.windows(2).any(|w| w == ["--model", "gpt-5-codex"]));
        assert!(!args.iter().any(|a| a == "--sandbox"));
    }

    #[test]
    fn test_edit_passes_sandbox() {
        let fake = tempfile::NamedTempFile::new().unwrap();
        let backend = backend_with_binary(fake.path().to_path_buf());

        let request = OperationRequest::edit("x = 1", "rename x");
        let invocation = backend.build_invocation(&request).unwrap();

        let args = args_of(&invocation);
        assert!(args.windows(2).any(|w| w == ["--sandbox", "workspace-write"]));
        assert!(invocation.stdin.unwrap().contains("rename x"));
    }

    #[test]
    fn test_exec_skips_binary_discovery() {
        let backend = backend_with_binary(PathBuf::from("/nonexistent/codex"));
        let request = OperationRequest::exec("echo Hello", false);
        let invocation = backend.build_invocation(&request).unwrap();
        assert!(!invocation.needs_capture_file());
        assert_eq!(invocation.kind, OperationKind::Exec);
    }

    #[test]
    fn test_missing_binary_is_reported_before_spawn() {
        let backend = backend_with_binary(PathBuf::from("/nonexistent/codex"));
        let request = OperationRequest::explain("x = 1");
        let err = backend.build_invocation(&request).unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound(_)));
    }
}
