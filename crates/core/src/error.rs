//! Error types for zizmor-action bootstrap operations.
//!
//! Every variant here is a bootstrap failure: the wrapper reports it once on
//! the CI error channel and exits with code 1. A non-zero exit from zizmor
//! itself is not an error and never passes through this type.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for zizmor-action operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the action before or instead of running zizmor.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A required input environment variable is not set.
    #[error("Missing required environment variable {variable}")]
    #[diagnostic(
        code(zizmor_action::inputs::missing),
        help("Inputs are passed from action.yml as GHA_ZIZMOR_* environment variables")
    )]
    MissingInput {
        /// The environment variable that was looked up
        variable: String,
    },

    /// An input was present but failed to parse.
    #[error("couldn't parse input {input}: {message}")]
    #[diagnostic(code(zizmor_action::inputs::invalid))]
    InvalidInput {
        /// The action input name (e.g. `min-severity`)
        input: String,
        /// Why the value was rejected
        message: String,
    },

    /// A scan target looks like a command-line flag.
    #[error("Invalid input: {target} looks like a flag")]
    #[diagnostic(
        code(zizmor_action::inputs::flag_like),
        help("Only paths and repository slugs may be passed as inputs")
    )]
    FlagLikeTarget {
        /// The offending target
        target: String,
    },

    /// A variable the runner normally provides is missing.
    #[error("{variable} not set")]
    #[diagnostic(code(zizmor_action::environment))]
    MissingEnvironment {
        /// The environment variable name
        variable: &'static str,
    },

    /// The host is not one of the platforms zizmor publishes binaries for.
    #[error("unsupported platform: {os}-{arch}")]
    #[diagnostic(
        code(zizmor_action::platform::unsupported),
        help("Prebuilt binaries exist for linux and macOS on x86_64 and aarch64; try distribution `uvx`")
    )]
    UnsupportedPlatform {
        /// Host operating system as reported by the standard library
        os: String,
        /// Host architecture as reported by the standard library
        arch: String,
    },

    /// A helper executable could not be found on `PATH`.
    #[error("{tool} not found in PATH")]
    #[diagnostic(code(zizmor_action::tools::not_found))]
    ToolNotFound {
        /// The executable name
        tool: &'static str,
    },

    /// Looking up or downloading a release failed.
    #[error("Release download failed: {message}")]
    #[diagnostic(code(zizmor_action::release::download))]
    Download {
        /// Error message
        message: String,
    },

    /// A downloaded artifact failed authenticity checks.
    #[error("Artifact verification failed: {message}")]
    #[diagnostic(
        code(zizmor_action::release::verification),
        help("The artifact was not unpacked or executed")
    )]
    Verification {
        /// Error message
        message: String,
    },

    /// The release archive could not be unpacked or lacks the executable.
    #[error("Failed to extract zizmor: {message}")]
    #[diagnostic(code(zizmor_action::release::extraction))]
    Extraction {
        /// Error message
        message: String,
    },

    /// The tool process could not be started.
    #[error("Failed to spawn {}: {source}", program.display())]
    #[diagnostic(code(zizmor_action::runner::spawn))]
    Spawn {
        /// The program that failed to start
        program: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A filesystem operation failed.
    #[error("{operation} {}: {source}", path.display())]
    #[diagnostic(code(zizmor_action::io))]
    Io {
        /// What was being attempted
        operation: &'static str,
        /// The path involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a release download error.
    #[must_use]
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Create an artifact verification error.
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create an I/O error tied to a path.
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
