//! zizmor command-line assembly.

use crate::inputs::Inputs;
use crate::tools::ProvisionedTool;
use std::fmt;
use std::path::{Path, PathBuf};

/// Output format requested from zizmor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable findings, forwarded to the job log.
    Plain,
    /// SARIF, uploaded to GitHub Advanced Security.
    Sarif,
}

impl OutputFormat {
    /// Select the format for the `advanced-security` input.
    #[must_use]
    pub fn from_advanced_security(advanced_security: bool) -> Self {
        if advanced_security {
            Self::Sarif
        } else {
            Self::Plain
        }
    }

    /// The `--format` flag zizmor expects.
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::Plain => "--format=plain",
            Self::Sarif => "--format=sarif",
        }
    }
}

/// A fully assembled zizmor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZizmorCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ZizmorCommand {
    /// Create a command from an explicit program and argument list.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Assemble the invocation for a provisioned tool.
    ///
    /// Targets always follow `--`, so a target can never be read as a flag
    /// even if it slipped past input validation.
    #[must_use]
    pub fn build(tool: &ProvisionedTool, inputs: &Inputs) -> Self {
        let mut args = tool.leading_args().to_vec();
        args.push("--color=always".to_string());
        args.push(
            OutputFormat::from_advanced_security(inputs.advanced_security)
                .flag()
                .to_string(),
        );

        if !inputs.online_audits {
            args.push("--no-online-audits".to_string());
        }

        args.push(format!("--persona={}", inputs.persona));
        if let Some(severity) = inputs.min_severity {
            args.push(format!("--min-severity={severity}"));
        }
        if let Some(confidence) = inputs.min_confidence {
            args.push(format!("--min-confidence={confidence}"));
        }

        args.push("--".to_string());
        args.extend(inputs.targets.iter().cloned());

        Self::new(tool.program(), args)
    }

    /// Executable to spawn.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, not including the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for ZizmorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program.to_string_lossy();
        let words = std::iter::once(program.as_ref()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(joined) => f.write_str(&joined),
            Err(_) => write!(f, "{program} {:?}", self.args),
        }
    }
}
