//! Command-line argument construction for the Gemini binary.

use std::ffi::OsString;

/// Operation selected on the Gemini command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    /// `gemini generate`
    Generate,
    /// `gemini explain`
    Explain,
    /// `gemini edit`
    Edit,
}

impl Subcommand {
    /// Spelling on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Explain => "explain",
            Self::Edit => "edit",
        }
    }
}

/// Per-run flags for a Gemini invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeminiConfig {
    /// `--model`; omitted when empty.
    pub model: Option<String>,
    /// `--approval`; omitted when empty.
    pub approval_mode: Option<String>,
}

/// Builds the argument list for a Gemini subprocess invocation.
#[must_use]
pub fn build_args(subcommand: Subcommand, config: &GeminiConfig) -> Vec<OsString> {
    let mut args = Vec::new();

    args.push(OsString::from(subcommand.as_str()));

    if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
        args.push(OsString::from("--model"));
        args.push(OsString::from(model));
    }

    if let Some(mode) = config.approval_mode.as_deref().filter(|m| !m.is_empty()) {
        args.push(OsString::from("--approval"));
        args.push(OsString::from(mode));
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_flag_set() {
        let config = GeminiConfig {
            model: Some("gemini-1".to_string()),
            approval_mode: Some("suggest".to_string()),
        };
        let args: Vec<String> = build_args(Subcommand::Edit, &config)
            .iter()
            .filter_map(|s| s.to_str().map(str::to_owned))
            .collect();
        assert_eq!(
            args,
            vec!["edit", "--model", "gemini-1", "--approval", "suggest"]
        );
    }

    #[test]
    fn test_bare_subcommand_when_unset() {
        let args = build_args(Subcommand::Explain, &GeminiConfig::default());
        assert_eq!(args, vec![OsString::from("explain")]);
    }
}
