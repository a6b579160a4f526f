//! Tool provisioning.
//!
//! A [`ToolProvider`] turns a requested [`ToolVersion`] into a runnable
//! [`ProvisionedTool`]. Two sources exist:
//!
//! - GitHub releases, downloaded and verified before use (the
//!   `zizmor-action-github` crate)
//! - [`UvxToolProvider`], which hands version resolution to `uvx` on `PATH`
//!
//! # Example
//!
//! ```ignore
//! use zizmor_action_core::tools::{ToolProvider, UvxToolProvider};
//!
//! let provider = UvxToolProvider::new();
//! let tool = provider.provision(&inputs.version)?;
//! let command = ZizmorCommand::build(&tool, &inputs);
//! ```

mod platform;
mod uvx;

pub use platform::{Arch, Os, Platform};
pub use uvx::UvxToolProvider;

use crate::Result;
use crate::inputs::ToolVersion;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the executable shipped in zizmor releases.
pub const ZIZMOR_BINARY: &str = "zizmor";

/// A source of runnable zizmor executables.
pub trait ToolProvider {
    /// Get the provider name (e.g., "release", "uvx").
    fn name(&self) -> &'static str;

    /// Get a human-readable description of this provider.
    fn description(&self) -> &'static str;

    /// Make the requested version runnable.
    ///
    /// Any failure here is fatal; no subprocess may run afterwards.
    fn provision(&self, version: &ToolVersion) -> Result<ProvisionedTool>;
}

/// A runnable zizmor, ready to have its flags appended.
#[derive(Debug)]
pub struct ProvisionedTool {
    program: PathBuf,
    leading_args: Vec<String>,
    /// Scratch directory holding an extracted binary; removed on drop.
    workdir: Option<TempDir>,
}

impl ProvisionedTool {
    /// Wrap an executable path.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            workdir: None,
        }
    }

    /// Arguments that must precede zizmor's own flags.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Tie the lifetime of a scratch directory to this tool.
    #[must_use]
    pub fn with_workdir(mut self, workdir: TempDir) -> Self {
        self.workdir = Some(workdir);
        self
    }

    /// Executable to spawn.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments placed before zizmor's flags.
    #[must_use]
    pub fn leading_args(&self) -> &[String] {
        &self.leading_args
    }

    /// Scratch directory owned by this tool, if any.
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }
}
