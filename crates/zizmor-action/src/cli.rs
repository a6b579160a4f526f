//! Command-line flags for the launcher itself.
//!
//! The action's inputs (`GHA_ZIZMOR_INPUTS` and friends) are not flags; they
//! are read by [`zizmor_action_core::inputs`].

use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use clap::{Parser, ValueEnum};
use zizmor_action_github::{DEFAULT_API_URL, DEFAULT_REPOSITORY};

/// How zizmor gets onto the runner.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Distribution {
    /// Download and verify a prebuilt binary from GitHub Releases.
    #[default]
    Release,
    /// Run the PyPI package through `uvx`.
    Uvx,
}

/// zizmor-action command line.
#[derive(Parser, Debug)]
#[command(name = "zizmor-action")]
#[command(about = "Provision and run zizmor inside a GitHub Actions step")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Where the zizmor executable comes from.
    #[arg(
        long,
        env = "GHA_ZIZMOR_DISTRIBUTION",
        default_value = "release",
        value_enum
    )]
    pub distribution: Distribution,

    /// Repository zizmor releases are fetched from.
    #[arg(long, env = "GHA_ZIZMOR_REPOSITORY", default_value = DEFAULT_REPOSITORY)]
    pub repository: String,

    /// GitHub REST API endpoint releases are looked up on.
    ///
    /// Not `GITHUB_API_URL`: on Enterprise Server runners that
    /// points at the local instance, while zizmor's releases and their
    /// attestations live on github.com.
    #[arg(long, env = "GHA_ZIZMOR_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Buffer zizmor's stderr and replay it after the run instead of streaming it.
    #[arg(long)]
    pub capture_stderr: bool,

    /// Logging verbosity level.
    #[arg(
        long,
        env = "GHA_ZIZMOR_LOG_LEVEL",
        default_value = "warn",
        value_enum
    )]
    pub log_level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        env = "GHA_ZIZMOR_LOG_FORMAT",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

impl Cli {
    /// Tracing settings requested on the command line.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: self.log_format,
            level: self.log_level.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPER_VARS: [(&str, Option<&str>); 5] = [
        ("GHA_ZIZMOR_DISTRIBUTION", None),
        ("GHA_ZIZMOR_REPOSITORY", None),
        ("GHA_ZIZMOR_API_URL", None),
        ("GHA_ZIZMOR_LOG_LEVEL", None),
        ("GHA_ZIZMOR_LOG_FORMAT", None),
    ];

    #[test]
    fn test_cli_default_values() {
        temp_env::with_vars(WRAPPER_VARS, || {
            let cli = Cli::try_parse_from(["zizmor-action"]).unwrap();

            assert_eq!(cli.distribution, Distribution::Release);
            assert_eq!(cli.repository, "zizmorcore/zizmor");
            assert_eq!(cli.api_url, "https://api.github.com");
            assert!(!cli.capture_stderr);
            assert_eq!(cli.log_level, LogLevel::Warn);
            assert_eq!(cli.log_format, TracingFormat::Compact);
        });
    }

    #[test]
    fn test_cli_flags() {
        temp_env::with_vars(WRAPPER_VARS, || {
            let cli = Cli::try_parse_from([
                "zizmor-action",
                "--distribution",
                "uvx",
                "--capture-stderr",
                "--log-level",
                "debug",
                "--log-format",
                "json",
            ])
            .unwrap();

            assert_eq!(cli.distribution, Distribution::Uvx);
            assert!(cli.capture_stderr);
            let config = cli.tracing_config();
            assert_eq!(config.level, crate::tracing::Level::DEBUG);
            assert_eq!(config.format, TracingFormat::Json);
        });
    }

    #[test]
    fn test_cli_reads_runner_environment() {
        temp_env::with_vars(
            [
                ("GHA_ZIZMOR_DISTRIBUTION", Some("uvx")),
                ("GHA_ZIZMOR_REPOSITORY", Some("fork/zizmor")),
                ("GHA_ZIZMOR_API_URL", Some("https://ghe.example.com/api/v3")),
                ("GHA_ZIZMOR_LOG_LEVEL", None),
                ("GHA_ZIZMOR_LOG_FORMAT", None),
            ],
            || {
                let cli = Cli::try_parse_from(["zizmor-action"]).unwrap();
                assert_eq!(cli.distribution, Distribution::Uvx);
                assert_eq!(cli.repository, "fork/zizmor");
                assert_eq!(cli.api_url, "https://ghe.example.com/api/v3");
            },
        );
    }

    #[test]
    fn test_cli_ignores_enterprise_api_url() {
        temp_env::with_vars(
            [
                ("GHA_ZIZMOR_API_URL", None),
                ("GITHUB_API_URL", Some("https://ghe.example.com/api/v3")),
            ],
            || {
                let cli = Cli::try_parse_from(["zizmor-action"]).unwrap();
                assert_eq!(cli.api_url, "https://api.github.com");
            },
        );
    }

    #[test]
    fn test_cli_rejects_unknown_distribution() {
        temp_env::with_vars(WRAPPER_VARS, || {
            assert!(Cli::try_parse_from(["zizmor-action", "--distribution", "pip"]).is_err());
        });
    }
}
