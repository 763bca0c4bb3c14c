//! Effective backend configuration and the layered resolver that builds it.
//!
//! Each field is taken from the first tier that supplies a non-empty, valid
//! value:
//!
//! 1. explicit [`Overrides`] passed by the caller,
//! 2. environment variables (`RSCODEX_<BACKEND>_CLI`, `RSCODEX_<BACKEND>_MODEL`,
//!    `RSCODEX_<BACKEND>_SANDBOX`, `RSCODEX_APPROVAL`, `RSCODEX_TIMEOUT_SECS`),
//! 3. the `[backend.<name>]` section of `~/.rscodex/config.toml`,
//! 4. compiled-in defaults.
//!
//! Resolution never fails. A missing or malformed document contributes
//! nothing, and an unparseable value is skipped with a warning.

use crate::errors::Error;
use codex_adapter::SandboxMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Overrides the location of the persisted configuration document.
pub const CONFIG_PATH_ENV_VAR: &str = "RSCODEX_CONFIG";
/// Approval mode for every backend.
pub const APPROVAL_ENV_VAR: &str = "RSCODEX_APPROVAL";
/// Process time budget in whole seconds.
pub const TIMEOUT_ENV_VAR: &str = "RSCODEX_TIMEOUT_SECS";

/// Default time budget for a single CLI run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How much the caller trusts shell commands run through `exec_command`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalMode {
    /// Ask before running a command flagged as safe.
    #[default]
    Suggest,
    /// Run without asking; edits are expected to be applied by the CLI.
    AutoEdit,
    /// Run everything without asking.
    FullAuto,
}

impl ApprovalMode {
    /// Canonical spelling, also used on the Gemini command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suggest => "suggest",
            Self::AutoEdit => "auto-edit",
            Self::FullAuto => "full-auto",
        }
    }
}

impl fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "suggest" => Ok(Self::Suggest),
            "auto-edit" => Ok(Self::AutoEdit),
            "full-auto" => Ok(Self::FullAuto),
            other => Err(format!(
                "unknown approval mode '{other}' (expected suggest, auto-edit or full-auto)"
            )),
        }
    }
}

/// Concrete CLI tool behind the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// OpenAI Codex CLI.
    Codex,
    /// Gemini CLI.
    Gemini,
}

impl BackendKind {
    /// Parses a backend name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedBackend`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name.trim().to_ascii_lowercase().as_str() {
            "codex" => Ok(Self::Codex),
            "gemini" => Ok(Self::Gemini),
            _ => Err(Error::UnsupportedBackend(name.to_string())),
        }
    }

    /// Name used for config sections and log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    const fn env_prefix(self) -> &'static str {
        match self {
            Self::Codex => "RSCODEX_CODEX",
            Self::Gemini => "RSCODEX_GEMINI",
        }
    }

    const fn default_binary(self) -> &'static str {
        match self {
            Self::Codex => codex_adapter::DEFAULT_CODEX_BIN,
            Self::Gemini => gemini_adapter::DEFAULT_GEMINI_BIN,
        }
    }

    const fn default_model(self) -> &'static str {
        match self {
            Self::Codex => "gpt-5-codex",
            Self::Gemini => "gemini-1",
        }
    }

    /// Environment variable carrying the binary path for this backend.
    #[must_use]
    pub fn binary_env_var(self) -> String {
        format!("{}_CLI", self.env_prefix())
    }

    /// Environment variable carrying the model for this backend.
    #[must_use]
    pub fn model_env_var(self) -> String {
        format!("{}_MODEL", self.env_prefix())
    }

    /// Environment variable carrying the sandbox mode for this backend.
    #[must_use]
    pub fn sandbox_env_var(self) -> String {
        format!("{}_SANDBOX", self.env_prefix())
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully resolved configuration for one facade instance.
///
/// Built once at construction and never mutated; build a new facade to
/// change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Which backend this configuration belongs to.
    pub backend: BackendKind,
    /// Executable name or path. Checked only when a run is built.
    pub binary_path: PathBuf,
    /// Model name. Empty means "let the binary choose".
    pub model: String,
    /// Filesystem isolation passed to filesystem-writing runs.
    pub sandbox: SandboxMode,
    /// Approval gate policy for shell execution.
    pub approval: ApprovalMode,
    /// Time budget for a single child process.
    pub timeout: Duration,
}

/// Caller-supplied values that win over every other tier.
///
/// Unset fields fall through to the environment, the config document and
/// finally the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Binary path or name.
    pub binary_path: Option<PathBuf>,
    /// Model name. An empty string counts as unset.
    pub model: Option<String>,
    /// Sandbox mode.
    pub sandbox: Option<SandboxMode>,
    /// Approval mode.
    pub approval: Option<ApprovalMode>,
    /// Time budget.
    pub timeout: Option<Duration>,
}

/// One `[backend.<name>]` table of the config document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BackendSection {
    /// Binary path or name.
    pub cli: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Sandbox mode spelling.
    pub sandbox: Option<String>,
    /// Approval mode spelling.
    pub approval_mode: Option<String>,
    /// Time budget in seconds.
    pub timeout_secs: Option<u64>,
}

/// The persisted, human-editable configuration document.
///
/// ```toml
/// [backend.codex]
/// cli = "codex"
/// model = "gpt-5-codex"
/// sandbox = "read-only"
/// approval_mode = "suggest"
/// timeout_secs = 300
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigDocument {
    /// Sections keyed by backend name.
    #[serde(default)]
    pub backend: BTreeMap<String, BackendSection>,
}

impl ConfigDocument {
    /// Parses a document, treating malformed input as empty.
    #[must_use]
    pub fn from_toml_str(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring malformed config document");
            Self::default()
        })
    }

    /// Reads and parses the document at `path`.
    ///
    /// A missing file is silently empty; any other failure is logged and
    /// also yields an empty document.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded config document");
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config document; using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config document");
                Self::default()
            }
        }
    }

    /// `$RSCODEX_CONFIG`, else `~/.rscodex/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV_VAR).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".rscodex").join("config.toml"))
    }

    /// Loads the document from [`ConfigDocument::default_path`].
    #[must_use]
    pub fn load_default() -> Self {
        Self::default_path()
            .map(|path| Self::load(&path))
            .unwrap_or_default()
    }

    /// The section for `backend`, if the document has one.
    #[must_use]
    pub fn section(&self, backend: BackendKind) -> Option<&BackendSection> {
        self.backend.get(backend.name())
    }
}

/// Resolves configuration from the process environment and the default
/// config document location.
#[must_use]
pub fn resolve(backend: BackendKind, overrides: &Overrides) -> BackendConfig {
    let document = ConfigDocument::load_default();
    resolve_with(backend, overrides, |key| std::env::var(key).ok(), &document)
}

/// Resolves configuration from explicitly supplied sources.
///
/// `env` looks up environment variables by name, so callers can resolve
/// against a fixed map instead of process-global state.
pub fn resolve_with<F>(
    backend: BackendKind,
    overrides: &Overrides,
    env: F,
    document: &ConfigDocument,
) -> BackendConfig
where
    F: Fn(&str) -> Option<String>,
{
    let empty = BackendSection::default();
    let section = document.section(backend).unwrap_or(&empty);

    let binary_path = layered(
        "binary_path",
        overrides
            .binary_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty()),
        env(&backend.binary_env_var()),
        section.cli.clone(),
    )
    .unwrap_or_else(|| PathBuf::from(backend.default_binary()));

    let model = layered(
        "model",
        overrides.model.clone().filter(|m| !m.trim().is_empty()),
        env(&backend.model_env_var()),
        section.model.clone(),
    )
    .unwrap_or_else(|| backend.default_model().to_string());

    let sandbox = layered(
        "sandbox",
        overrides.sandbox,
        env(&backend.sandbox_env_var()),
        section.sandbox.clone(),
    )
    .unwrap_or_default();

    let approval = layered(
        "approval_mode",
        overrides.approval,
        env(APPROVAL_ENV_VAR),
        section.approval_mode.clone(),
    )
    .unwrap_or_default();

    let timeout = overrides
        .timeout
        .or_else(|| {
            layered::<u64>(
                "timeout_secs",
                None,
                env(TIMEOUT_ENV_VAR),
                section.timeout_secs.map(|secs| secs.to_string()),
            )
            .map(Duration::from_secs)
        })
        .unwrap_or(DEFAULT_TIMEOUT);

    let config = BackendConfig {
        backend,
        binary_path,
        model,
        sandbox,
        approval,
        timeout,
    };
    debug!(?config, "resolved backend configuration");
    config
}

/// Picks the first usable value: explicit, then environment, then document.
fn layered<T>(
    field: &'static str,
    explicit: Option<T>,
    from_env: Option<String>,
    from_file: Option<String>,
) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if explicit.is_some() {
        return explicit;
    }

    [("environment", from_env), ("config file", from_file)]
        .into_iter()
        .filter_map(|(source, raw)| {
            raw.map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .map(|r| (source, r))
        })
        .find_map(|(source, raw)| match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(field, source, value = %raw, error = %e, "ignoring invalid configuration value");
                None
            }
        })
}
