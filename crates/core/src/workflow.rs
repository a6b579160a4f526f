//! GitHub Actions runner integration: workflow commands and step outputs.

use crate::{Error, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Escape a workflow command message so it stays on one line.
#[must_use]
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Emits `::error::` and `::debug::` workflow commands.
#[derive(Debug)]
pub struct Annotations<W: Write> {
    out: W,
    debug: bool,
}

impl<W: Write> Annotations<W> {
    /// Write commands to `out`. Debug commands are dropped unless `debug`.
    pub fn new(out: W, debug: bool) -> Self {
        Self { out, debug }
    }

    /// Emit an error annotation.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "::error::{}", escape_data(message))?;
        self.out.flush()
    }

    /// Emit a debug message, if step debugging is on.
    pub fn debug(&mut self, message: &str) -> io::Result<()> {
        if !self.debug {
            return Ok(());
        }
        writeln!(self.out, "::debug::{}", escape_data(message))?;
        self.out.flush()
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Variables the Actions runner provides to every step.
#[derive(Debug, Clone, Default)]
pub struct RunnerEnvironment {
    /// `RUNNER_TEMP`: scratch space cleaned after the job.
    pub runner_temp: Option<PathBuf>,
    /// `GITHUB_OUTPUT`: step output record file.
    pub github_output: Option<PathBuf>,
    /// `RUNNER_DEBUG=1`: step debug logging is enabled.
    pub debug: bool,
}

impl RunnerEnvironment {
    /// Read the runner variables from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let path = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            runner_temp: path("RUNNER_TEMP"),
            github_output: path("GITHUB_OUTPUT"),
            debug: std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1"),
        }
    }

    /// `RUNNER_TEMP`, or an error if unset.
    pub fn require_runner_temp(&self) -> Result<&Path> {
        self.runner_temp
            .as_deref()
            .ok_or(Error::MissingEnvironment {
                variable: "RUNNER_TEMP",
            })
    }

    /// The step output file, or an error if `GITHUB_OUTPUT` is unset.
    pub fn require_outputs(&self) -> Result<StepOutputs> {
        self.github_output
            .clone()
            .map(StepOutputs::new)
            .ok_or(Error::MissingEnvironment {
                variable: "GITHUB_OUTPUT",
            })
    }
}

/// The append-only `GITHUB_OUTPUT` record file.
#[derive(Debug, Clone)]
pub struct StepOutputs {
    path: PathBuf,
}

impl StepOutputs {
    /// Write outputs to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `name=value`. Multi-line values use the heredoc form.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let record = if value.contains('\n') || value.contains('\r') {
            let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
            format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
        } else {
            format!("{name}={value}\n")
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io("Failed to open", &self.path, e))?;
        file.write_all(record.as_bytes())
            .map_err(|e| Error::io("Failed to write", &self.path, e))?;

        debug!(%name, path = %self.path.display(), "Set step output");
        Ok(())
    }
}
