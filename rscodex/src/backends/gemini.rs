use crate::approval::Approver;
use crate::backend::Backend;
use crate::config::{BackendConfig, BackendKind};
use crate::errors::Error;
use crate::invocation::{shell_invocation, Invocation};
use crate::prompts;
use crate::request::{OperationKind, OperationRequest};
use crate::runner::ProcessRunner;
use gemini_adapter::{build_args, discover_gemini, GeminiConfig, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Placeholder backend for the Gemini CLI: one subcommand per operation,
/// answer read from stdout.
pub struct GeminiBackend {
    config: BackendConfig,
    runner: Arc<dyn ProcessRunner>,
    approver: Arc<dyn Approver>,
}

impl GeminiBackend {
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
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

const fn subcommand_for(kind: OperationKind) -> Option<Subcommand> {
    match kind {
        OperationKind::Generate => Some(Subcommand::Generate),
        OperationKind::Explain => Some(Subcommand::Explain),
        OperationKind::Edit => Some(Subcommand::Edit),
        OperationKind::Exec => None,
    }
}

impl Backend for GeminiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
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
        Ok(discover_gemini(&self.config.binary_path)?)
    }

    fn build_invocation(&self, request: &OperationRequest) -> Result<Invocation, Error> {
        let Some(subcommand) = subcommand_for(request.kind) else {
            return Ok(shell_invocation(request, &self.config));
        };

        let gemini_config = GeminiConfig {
            model: Some(self.config.model.clone()),
            approval_mode: Some(self.config.approval.as_str().to_string()),
        };

        Ok(Invocation {
            kind: request.kind,
            program: self.locate()?,
            args: build_args(subcommand, &gemini_config),
            stdin: Some(prompts::compose(request)),
            capture: None,
            requires_approval: false,
            timeout: self.config.timeout,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::approval::AutoApprove;
    use crate::config::{resolve_with, ConfigDocument, Overrides};
    use crate::runner::SubprocessRunner;

    #[test]
    fn test_explain_invocation_shape() {
        let fake = tempfile::NamedTempFile::new().unwrap();
        let overrides = Overrides {
            binary_path: Some(fake.path().to_path_buf()),
            ..Overrides::default()
        };
        let config = resolve_with(
            BackendKind::Gemini,
            &overrides,
            |_| None,
            &ConfigDocument::default(),
        );
        let backend = GeminiBackend::new(config, Arc::new(SubprocessRunner), Arc::new(AutoApprove));

        let invocation = backend
            .build_invocation(&OperationRequest::explain("x = 1"))
            .unwrap();

        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["explain", "--model", "gemini-1", "--approval", "suggest"]
        );
        assert!(!invocation.needs_capture_file());
        assert!(invocation.stdin.unwrap().contains("x = 1"));
    }
}
