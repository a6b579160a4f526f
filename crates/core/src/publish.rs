//! Routing zizmor's output back to the workflow.

use crate::command::OutputFormat;
use crate::runner::ToolOutput;
use crate::workflow::StepOutputs;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Step output that carries the SARIF report path.
pub const SARIF_OUTPUT: &str = "sarif-file";

/// File name of the SARIF report inside its scratch directory.
pub const SARIF_FILE_NAME: &str = "results.sarif";

/// Where zizmor's stdout ends up.
#[derive(Debug, Clone)]
pub enum Destination {
    /// Forwarded verbatim to the wrapper's stdout.
    Stdout,
    /// Written to a fresh file under `scratch_root`, with its path published
    /// as the `sarif-file` step output.
    SarifFile {
        /// Directory new report directories are created in (`RUNNER_TEMP`).
        scratch_root: PathBuf,
        /// The step output record.
        outputs: StepOutputs,
    },
}

impl Destination {
    /// The output format zizmor must produce for this destination.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Stdout => OutputFormat::Plain,
            Self::SarifFile { .. } => OutputFormat::Sarif,
        }
    }
}

/// Publish one run's output.
///
/// Captured stderr, if any, is replayed to `stderr` first. Returns the SARIF
/// path when one was written. The caller is responsible for exiting with
/// [`ToolOutput::exit_code`].
pub fn publish(
    output: &ToolOutput,
    destination: &Destination,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> Result<Option<PathBuf>> {
    if !output.stderr.is_empty() {
        stderr
            .write_all(&output.stderr)
            .and_then(|()| stderr.flush())
            .map_err(|e| Error::io("Failed to write", "<stderr>", e))?;
    }

    match destination {
        Destination::Stdout => {
            stdout
                .write_all(&output.stdout)
                .and_then(|()| stdout.flush())
                .map_err(|e| Error::io("Failed to write", "<stdout>", e))?;
            Ok(None)
        }
        Destination::SarifFile {
            scratch_root,
            outputs,
        } => {
            let path = write_sarif(scratch_root, &output.stdout)?;
            outputs.set(SARIF_OUTPUT, &path.to_string_lossy())?;
            info!(path = %path.display(), "Published SARIF report");
            Ok(Some(path))
        }
    }
}

fn write_sarif(scratch_root: &Path, contents: &[u8]) -> Result<PathBuf> {
    // Later steps upload the report, so the directory outlives this process.
    let dir = tempfile::Builder::new()
        .prefix("zizmor-sarif-")
        .tempdir_in(scratch_root)
        .map_err(|e| Error::io("Failed to create directory in", scratch_root, e))?
        .keep();

    let path = dir.join(SARIF_FILE_NAME);
    std::fs::write(&path, contents).map_err(|e| Error::io("Failed to write", &path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &[u8], exit_code: i32) -> ToolOutput {
        ToolOutput {
            exit_code,
            stdout: stdout.to_vec(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn test_stdout_destination_is_verbatim() {
        let bytes = b"\x1b[31merror\x1b[0m[template-injection]\n\xff raw\n";
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let path = publish(&output(bytes, 14), &Destination::Stdout, &mut stdout, &mut stderr)
            .unwrap();

        assert!(path.is_none());
        assert_eq!(stdout, bytes);
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_sarif_destination_writes_file_and_output() {
        let scratch = tempfile::tempdir().unwrap();
        let record = scratch.path().join("github_output");
        let destination = Destination::SarifFile {
            scratch_root: scratch.path().to_path_buf(),
            outputs: StepOutputs::new(&record),
        };
        let sarif = br#"{"version":"2.1.0","runs":[]}"#;
        let mut stdout = Vec::new();

        let path = publish(&output(sarif, 0), &destination, &mut stdout, &mut Vec::new())
            .unwrap()
            .unwrap();

        assert!(stdout.is_empty());
        assert!(path.starts_with(scratch.path()));
        assert_eq!(std::fs::read(&path).unwrap(), sarif);
        assert_eq!(
            std::fs::read_to_string(&record).unwrap(),
            format!("sarif-file={}\n", path.display())
        );
    }

    #[test]
    fn test_each_run_gets_its_own_directory() {
        let scratch = tempfile::tempdir().unwrap();
        let first = write_sarif(scratch.path(), b"{}").unwrap();
        let second = write_sarif(scratch.path(), b"{}").unwrap();
        assert_ne!(first.parent(), second.parent());
    }

    #[test]
    fn test_captured_stderr_replayed() {
        let mut tool_output = output(b"", 1);
        tool_output.stderr = b"fatal: no audit was performed\n".to_vec();
        let mut stderr = Vec::new();

        publish(&tool_output, &Destination::Stdout, &mut Vec::new(), &mut stderr).unwrap();

        assert_eq!(stderr, b"fatal: no audit was performed\n");
    }

    #[test]
    fn test_destination_format() {
        assert_eq!(Destination::Stdout.format(), OutputFormat::Plain);
        let sarif = Destination::SarifFile {
            scratch_root: PathBuf::from("/tmp"),
            outputs: StepOutputs::new("/tmp/out"),
        };
        assert_eq!(sarif.format(), OutputFormat::Sarif);
    }
}
