//! One launcher run: inputs, provisioning, execution, publishing.

use crate::cli::{Cli, Distribution};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use tracing::{info, instrument};
use zizmor_action_core::command::ZizmorCommand;
use zizmor_action_core::inputs::Inputs;
use zizmor_action_core::publish::{Destination, publish};
use zizmor_action_core::runner::{StderrMode, ToolRunner};
use zizmor_action_core::tools::{ToolProvider, UvxToolProvider};
use zizmor_action_core::workflow::{Annotations, RunnerEnvironment};
use zizmor_action_core::{Error, Result};
use zizmor_action_github::GitHubReleaseProvider;

/// Exit code for any failure before zizmor produced a result.
pub const EXIT_BOOTSTRAP_FAILURE: i32 = 1;

/// Run zizmor once and publish its output.
///
/// Returns zizmor's exit code. Every `Err` happens before zizmor's output is
/// published, and all input and runner-environment errors happen before it
/// is spawned.
#[instrument(name = "launch", skip_all, fields(distribution = ?cli.distribution))]
pub fn run<W: Write>(
    cli: &Cli,
    runner: &RunnerEnvironment,
    annotations: &mut Annotations<W>,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> Result<i32> {
    let inputs = Inputs::from_env()?;
    let destination = destination(&inputs, runner)?;

    annotate(
        annotations,
        &format!(
            "inputs={:?} version={} advanced_security={}",
            inputs.targets, inputs.version, inputs.advanced_security
        ),
    )?;

    let provider = provider(cli, runner, &inputs.token)?;
    info!(
        provider = provider.name(),
        description = provider.description(),
        version = %inputs.version,
        "Provisioning zizmor"
    );
    let tool = provider.provision(&inputs.version)?;
    annotate(
        annotations,
        &format!("{}: {}", provider.name(), tool.program().display()),
    )?;

    let command = ZizmorCommand::build(&tool, &inputs);
    annotate(annotations, &format!("running: {command}"))?;

    let stderr_mode = if cli.capture_stderr {
        StderrMode::Capture
    } else {
        StderrMode::Inherit
    };
    let output = ToolRunner::new(stderr_mode).run(&command, &inputs.token)?;

    let sarif = publish(&output, &destination, stdout, stderr)?;
    info!(
        exit_code = output.exit_code,
        format = ?destination.format(),
        sarif = ?sarif,
        "Published zizmor output"
    );

    Ok(output.exit_code)
}

/// Report a bootstrap failure: one `::error::` line plus a rendered report.
pub fn report<W: Write>(annotations: &mut Annotations<W>, stderr: &mut impl Write, err: Error) {
    tracing::error!(error = %err, "zizmor-action failed");
    // Nothing useful can be done if the runner's own pipes are gone.
    let _ = annotations.error(&err.to_string());
    let _ = writeln!(stderr, "{:?}", miette::Report::new(err));
}

fn destination(inputs: &Inputs, runner: &RunnerEnvironment) -> Result<Destination> {
    if !inputs.advanced_security {
        return Ok(Destination::Stdout);
    }

    Ok(Destination::SarifFile {
        scratch_root: runner.require_runner_temp()?.to_path_buf(),
        outputs: runner.require_outputs()?,
    })
}

fn provider(
    cli: &Cli,
    runner: &RunnerEnvironment,
    token: &SecretString,
) -> Result<Box<dyn ToolProvider>> {
    match cli.distribution {
        Distribution::Uvx => Ok(Box::new(UvxToolProvider::new())),
        Distribution::Release => {
            let scratch_root = runner.require_runner_temp()?;
            let token = SecretString::from(token.expose_secret().to_string());
            let provider = GitHubReleaseProvider::new(token, scratch_root)?
                .with_api_url(cli.api_url.as_str())
                .with_repository(cli.repository.as_str());
            Ok(Box::new(provider))
        }
    }
}

fn annotate<W: Write>(annotations: &mut Annotations<W>, message: &str) -> Result<()> {
    annotations
        .debug(message)
        .map_err(|e| Error::io("Failed to write", "<stdout>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use zizmor_action_core::inputs::ToolVersion;
    use zizmor_action_core::inputs::{Persona, parse_targets};

    fn inputs(advanced_security: bool) -> Inputs {
        Inputs {
            targets: parse_targets(".").unwrap(),
            online_audits: true,
            persona: Persona::Regular,
            min_severity: None,
            min_confidence: None,
            version: ToolVersion::Latest,
            token: SecretString::from("t".to_string()),
            advanced_security,
        }
    }

    #[test]
    fn test_plain_destination_needs_no_runner_environment() {
        let destination = destination(&inputs(false), &RunnerEnvironment::default()).unwrap();
        assert!(matches!(destination, Destination::Stdout));
    }

    #[test]
    fn test_sarif_destination_requires_runner_temp() {
        let runner = RunnerEnvironment {
            github_output: Some(PathBuf::from("/tmp/out")),
            ..RunnerEnvironment::default()
        };
        let err = destination(&inputs(true), &runner).unwrap_err();
        assert_eq!(err.to_string(), "RUNNER_TEMP not set");
    }

    #[test]
    fn test_sarif_destination_requires_github_output() {
        let runner = RunnerEnvironment {
            runner_temp: Some(PathBuf::from("/tmp")),
            ..RunnerEnvironment::default()
        };
        let err = destination(&inputs(true), &runner).unwrap_err();
        assert_eq!(err.to_string(), "GITHUB_OUTPUT not set");
    }

    #[test]
    fn test_report_writes_single_annotation() {
        let mut annotations = Annotations::new(Vec::new(), false);
        let mut stderr = Vec::new();

        report(
            &mut annotations,
            &mut stderr,
            Error::MissingInput {
                variable: "GHA_ZIZMOR_TOKEN".into(),
            },
        );

        let stdout = String::from_utf8(annotations.into_inner()).unwrap();
        assert_eq!(
            stdout,
            "::error::Missing required environment variable GHA_ZIZMOR_TOKEN\n"
        );
        assert!(String::from_utf8_lossy(&stderr).contains("GHA_ZIZMOR_TOKEN"));
    }
}
