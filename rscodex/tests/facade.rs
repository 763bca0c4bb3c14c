#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Facade behaviour driven through fake runners and real `sh` children.

use async_trait::async_trait;
use rscodex::invocation::Invocation;
use rscodex::{
    ApprovalMode, Coder, CoderBuilder, CommandResult, ConfigDocument, DenyAll, Error, ExecOutcome,
    OperationKind, ProcessRunner, RawOutcome,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

/// What a [`SpyRunner`] saw for one run.
#[derive(Debug, Clone)]
struct Seen {
    kind: OperationKind,
    args: Vec<String>,
    stdin: Option<String>,
    capture: Option<PathBuf>,
}

/// Canned reply for a [`SpyRunner`].
#[derive(Debug, Clone, Default)]
struct Reply {
    stdout: String,
    stderr: String,
    exit_code: i32,
    /// Written into the capture file, as the real CLI would.
    final_message: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct SpyRunner {
    seen: Arc<Mutex<Vec<Seen>>>,
    reply: Reply,
}

impl SpyRunner {
    fn replying(reply: Reply) -> Self {
        Self {
            seen: Arc::default(),
            reply,
        }
    }

    fn calls(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for SpyRunner {
    async fn run(&self, invocation: Invocation) -> Result<RawOutcome, Error> {
        let capture = invocation.capture.as_ref().map(|c| c.path().to_path_buf());
        self.seen.lock().unwrap().push(Seen {
            kind: invocation.kind,
            args: invocation
                .args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            stdin: invocation.stdin.clone(),
            capture: capture.clone(),
        });

        let captured = match (&capture, &self.reply.final_message) {
            (Some(path), Some(message)) => {
                std::fs::write(path, message).unwrap();
                Some(std::fs::read_to_string(path).unwrap())
            }
            _ => None,
        };

        Ok(RawOutcome {
            stdout: self.reply.stdout.clone(),
            stderr: self.reply.stderr.clone(),
            exit_code: self.reply.exit_code,
            captured,
            duration_ms: 1,
        })
    }
}

/// A builder that never reads the real environment or config file.
fn isolated(backend: &str) -> CoderBuilder {
    Coder::builder(backend)
        .config_document(ConfigDocument::default())
        .environment(Vec::<(String, String)>::new())
}

/// A codex facade whose binary "exists" and whose runs go to `runner`.
fn codex_with(runner: SpyRunner, binary: &NamedTempFile) -> Coder {
    isolated("codex")
        .binary_path(binary.path())
        .runner(runner)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_blank_inputs_never_spawn() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::default();
    let coder = codex_with(runner.clone(), &binary);

    assert!(matches!(coder.generate("", &[]).await, Err(Error::InvalidInput(_))));
    assert!(matches!(coder.explain("  \n").await, Err(Error::InvalidInput(_))));
    assert!(matches!(coder.edit("x = 1", "", &[]).await, Err(Error::InvalidInput(_))));
    assert!(matches!(coder.exec_command("", false).await, Err(Error::InvalidInput(_))));

    assert!(runner.calls().is_empty());
}

#[test]
fn test_unsupported_backend_is_rejected_at_construction() {
    let err = isolated("foo").build().unwrap_err();
    assert!(matches!(err, Error::UnsupportedBackend(ref name) if name == "foo"));
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_edit_returns_code_and_cleans_capture_file() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::replying(Reply {
        stdout: "[progress] reading files\n".to_string(),
        stderr: "model: gpt-5-codex\n".to_string(),
        final_message: Some(
            "Fixed:\n```python\ndef add(a,b):\n    return a + b\n```\n".to_string(),
        ),
        ..Reply::default()
    });
    let coder = codex_with(runner.clone(), &binary);

    let result = coder
        .edit("def add(a,b):\n    return a", "Fix to return a + b", &[])
        .await
        .unwrap();

    assert_eq!(result.code, "def add(a,b):\n    return a + b");
    assert_eq!(result.text, "Fixed:");
    assert_eq!(result.log, "model: gpt-5-codex\n");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, OperationKind::Edit);
    assert!(calls[0].args.windows(2).any(|w| w == ["--sandbox", "read-only"]));
    assert!(calls[0].stdin.as_deref().unwrap().contains("Fix to return a + b"));

    let capture = calls[0].capture.clone().unwrap();
    assert!(!capture.exists(), "capture file must not outlive the call");
}

#[tokio::test]
async fn test_generate_with_context_files_passes_them_through() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::replying(Reply {
        stdout: "def add(a, b):\n    return a + b\n".to_string(),
        ..Reply::default()
    });
    let coder = codex_with(runner.clone(), &binary);

    let files = vec![PathBuf::from("does/not/exist.py")];
    let result = coder.generate("Write add(a, b)", &files).await.unwrap();

    assert_eq!(result.code, "");
    assert!(result.text.contains("return a + b"));
    let stdin = runner.calls()[0].stdin.clone().unwrap();
    assert!(stdin.contains("does/not/exist.py"));
    assert!(stdin.ends_with("Write add(a, b)"));
}

#[tokio::test]
async fn test_edit_with_context_files_lists_them() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::replying(Reply {
        final_message: Some("```\ny = 1\n```".to_string()),
        ..Reply::default()
    });
    let coder = codex_with(runner.clone(), &binary);

    let files = vec![PathBuf::from("src/models.py")];
    let result = coder.edit("x = 1", "rename x to y", &files).await.unwrap();

    assert_eq!(result.code, "y = 1");
    let stdin = runner.calls()[0].stdin.clone().unwrap();
    assert!(stdin.starts_with("[CONTEXT FILES]"));
    assert!(stdin.contains("- src/models.py"));
    assert!(stdin.contains("rename x to y"));
}

#[tokio::test]
async fn test_nonzero_exit_with_final_message_is_success() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::replying(Reply {
        stderr: "warning: telemetry upload failed".to_string(),
        exit_code: 1,
        final_message: Some("The function adds two numbers.".to_string()),
        ..Reply::default()
    });
    let coder = codex_with(runner, &binary);

    let result = coder.explain("def add(a, b): return a + b").await.unwrap();
    assert_eq!(result.text, "The function adds two numbers.");
    assert_eq!(result.log, "warning: telemetry upload failed");
}

#[tokio::test]
async fn test_nonzero_exit_without_output_is_execution_failure() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::replying(Reply {
        stderr: "auth required".to_string(),
        exit_code: 2,
        ..Reply::default()
    });
    let coder = codex_with(runner, &binary);

    match coder.generate("hello", &[]).await {
        Err(Error::ExecutionFailed {
            exit_code, stderr, ..
        }) => {
            assert_eq!(exit_code, 2);
            assert_eq!(stderr, "auth required");
        }
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_binary_is_not_an_execution_failure() {
    let runner = SpyRunner::default();
    let coder = isolated("codex")
        .binary_path("/nonexistent/dir/codex")
        .runner(runner.clone())
        .build()
        .unwrap();

    let err = coder.generate("hello", &[]).await.unwrap_err();
    assert!(matches!(err, Error::BinaryNotFound(_)));
    assert!(err.is_launch_failure());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_declined_approval_cancels_without_spawning() {
    let runner = SpyRunner::default();
    let coder = isolated("codex")
        .runner(runner.clone())
        .approver(DenyAll)
        .build()
        .unwrap();

    let outcome = coder.exec_command("rm -rf build", true).await.unwrap();
    assert!(outcome.is_cancelled());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_approved_command_runs() {
    let asked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&asked);
    let runner = SpyRunner::replying(Reply {
        stdout: "ok\n".to_string(),
        ..Reply::default()
    });
    let coder = isolated("codex")
        .runner(runner.clone())
        .approver(move |command: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            command == "make test"
        })
        .build()
        .unwrap();

    let outcome = coder.exec_command("make test", true).await.unwrap();
    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.completed().unwrap().output, "ok\n");
    assert_eq!(runner.calls()[0].kind, OperationKind::Exec);
}

#[tokio::test]
async fn test_auto_modes_skip_the_approval_gate() {
    for mode in [ApprovalMode::AutoEdit, ApprovalMode::FullAuto] {
        let runner = SpyRunner::default();
        let coder = isolated("codex")
            .approval_mode(mode)
            .runner(runner.clone())
            .approver(|_: &str| -> bool { panic!("approver must not be consulted") })
            .build()
            .unwrap();

        let outcome = coder.exec_command("ls", true).await.unwrap();
        assert!(!outcome.is_cancelled());
        assert_eq!(runner.calls().len(), 1);
    }
}

#[tokio::test]
async fn test_gemini_uses_stdout() {
    let binary = NamedTempFile::new().unwrap();
    let runner = SpyRunner::replying(Reply {
        stdout: "```\nprint('hi')\n```".to_string(),
        ..Reply::default()
    });
    let coder = isolated("gemini")
        .binary_path(binary.path())
        .runner(runner.clone())
        .build()
        .unwrap();

    let result = coder.generate("say hi", &[]).await.unwrap();
    assert_eq!(result.code, "print('hi')");
    let calls = runner.calls();
    assert_eq!(calls[0].args[0], "generate");
    assert!(calls[0].capture.is_none());
}

#[cfg(unix)]
mod unix {
    use super::*;
    use rscodex::SubprocessRunner;
    use std::os::unix::fs::PermissionsExt;

    fn unattended(backend: &str) -> CoderBuilder {
        isolated(backend).runner(SubprocessRunner)
    }

    #[tokio::test]
    async fn test_exec_echo_is_byte_exact() {
        let coder = unattended("codex").build().unwrap();
        let outcome = coder.exec_command("echo Hello", false).await.unwrap();
        assert_eq!(
            outcome,
            ExecOutcome::Completed(CommandResult {
                output: "Hello\n".to_string(),
                error: String::new(),
                status_code: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_exec_nonzero_exit_attaches_output() {
        let coder = unattended("codex").build().unwrap();
        let err = coder
            .exec_command("echo partial; echo oops >&2; exit 3", false)
            .await
            .unwrap_err();

        match err {
            Error::ExecutionFailed {
                exit_code,
                stdout,
                stderr,
            } => {
                assert_eq!(exit_code, 3);
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exec_timeout_is_distinct_from_failure() {
        let coder = unattended("codex")
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = coder.exec_command("exec sleep 10", false).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }), "got {err:?}");
    }

    const FAKE_CODEX: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "codex-cli 0.1.0-test"
  exit 0
fi
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output-last-message" ]; then out="$2"; fi
  shift
done
prompt=$(cat)
echo "[progress] thinking"
printf 'received: %s\n' "$prompt" >&2
printf 'capture: %s\n' "$out" >&2
printf 'Here you go:\n```python\ndef add(a, b):\n    return a + b\n```\n' > "$out"
"#;

    fn install_fake_codex(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("codex");
        std::fs::write(&path, FAKE_CODEX).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_fake_cli_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let binary = install_fake_codex(&dir);
        let coder = unattended("codex").binary_path(&binary).build().unwrap();

        let result = coder.generate("Write add(a, b)", &[]).await.unwrap();

        assert_eq!(result.code, "def add(a, b):\n    return a + b");
        assert_eq!(result.text, "Here you go:");
        assert!(result.log.contains("received: Write add(a, b)"));

        let capture = result
            .log
            .lines()
            .find_map(|line| line.strip_prefix("capture: "))
            .map(PathBuf::from)
            .unwrap();
        assert!(!capture.exists(), "capture file must not outlive the call");
    }

    #[tokio::test]
    async fn test_health_check_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let binary = install_fake_codex(&dir);
        let coder = unattended("codex").binary_path(&binary).build().unwrap();

        assert_eq!(coder.check_health().await.unwrap(), "codex-cli 0.1.0-test");
    }
}
