//! zizmor process execution.
//!
//! The child gets a cleared environment containing only `GH_TOKEN`. zizmor
//! audits repository content, so nothing else from the runner's environment
//! is handed to it.

use crate::command::ZizmorCommand;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Environment variable zizmor reads its GitHub token from.
pub const TOKEN_ENV: &str = "GH_TOKEN";

/// What to do with the child's standard error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StderrMode {
    /// Stream straight to the wrapper's stderr.
    #[default]
    Inherit,
    /// Buffer in memory and hand back with the result.
    Capture,
}

/// Result of one zizmor run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit code (`128 + signal` if the process was killed)
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: Vec<u8>,
    /// Captured stderr, empty unless [`StderrMode::Capture`] was used
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Whether zizmor exited cleanly.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an assembled zizmor command to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolRunner {
    stderr: StderrMode,
}

impl ToolRunner {
    /// Create a runner with the given stderr handling.
    #[must_use]
    pub fn new(stderr: StderrMode) -> Self {
        Self { stderr }
    }

    /// Execute the command and wait for it.
    ///
    /// Blocks until the child exits; there is no timeout.
    #[tracing::instrument(name = "run_zizmor", skip_all, fields(program = %command.program().display()))]
    pub fn run(&self, command: &ZizmorCommand, token: &SecretString) -> Result<ToolOutput> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args());

        cmd.env_clear();
        cmd.env(TOKEN_ENV, token.expose_secret());

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        match self.stderr {
            StderrMode::Inherit => cmd.stderr(Stdio::inherit()),
            StderrMode::Capture => cmd.stderr(Stdio::piped()),
        };

        debug!(args = ?command.args(), stderr = ?self.stderr, "Spawning zizmor");
        let output = cmd.output().map_err(|source| Error::Spawn {
            program: command.program().to_path_buf(),
            source,
        })?;

        let exit_code = exit_code(output.status);
        info!(
            exit_code,
            stdout_bytes = output.stdout.len(),
            "zizmor finished"
        );

        Ok(ToolOutput {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn token() -> SecretString {
        SecretString::from("ghs_runner_test".to_string())
    }

    fn sh(script: &str) -> ZizmorCommand {
        ZizmorCommand::new("/bin/sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn test_captures_stdout_bytes() {
        let output = ToolRunner::default()
            .run(&sh("printf 'line one\\nline two'"), &token())
            .unwrap();
        assert_eq!(output.stdout, b"line one\nline two");
        assert!(output.success());
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn test_exit_code_propagates() {
        let output = ToolRunner::default().run(&sh("exit 3"), &token()).unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[test]
    fn test_signal_maps_to_shell_convention() {
        let output = ToolRunner::default()
            .run(&sh("kill -9 $$"), &token())
            .unwrap();
        assert_eq!(output.exit_code, 137);
    }

    #[test]
    fn test_environment_contains_only_token() {
        temp_env::with_var("ZIZMOR_ACTION_LEAK_CHECK", Some("leaked"), || {
            let output = ToolRunner::default()
                .run(
                    &sh("printf '%s|%s' \"$GH_TOKEN\" \"${ZIZMOR_ACTION_LEAK_CHECK-unset}\""),
                    &token(),
                )
                .unwrap();
            assert_eq!(String::from_utf8_lossy(&output.stdout), "ghs_runner_test|unset");
        });
    }

    #[test]
    fn test_capture_stderr() {
        let output = ToolRunner::new(StderrMode::Capture)
            .run(&sh("echo oops >&2; echo out"), &token())
            .unwrap();
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, b"oops\n");
    }

    #[test]
    fn test_spawn_failure() {
        let command = ZizmorCommand::new("/nonexistent/zizmor", vec![]);
        let err = ToolRunner::default().run(&command, &token()).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
