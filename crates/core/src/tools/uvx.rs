//! uvx-backed provisioning.
//!
//! `uvx zizmor@<version>` resolves, downloads and caches zizmor from PyPI, so
//! this provider only has to find `uvx` itself.

use super::{ProvisionedTool, ToolProvider, ZIZMOR_BINARY};
use crate::inputs::ToolVersion;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{debug, info};

/// Tool provider that delegates to `uvx` on `PATH`.
#[derive(Debug, Default)]
pub struct UvxToolProvider {
    search_path: Option<OsString>,
}

impl UvxToolProvider {
    /// Search the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Search an explicit `PATH`-style list instead of the process `PATH`.
    #[must_use]
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => which::which_in("uvx", Some(paths), "."),
            None => which::which("uvx"),
        };
        found.map_err(|e| {
            debug!(error = %e, "uvx lookup failed");
            Error::ToolNotFound { tool: "uvx" }
        })
    }
}

impl ToolProvider for UvxToolProvider {
    fn name(&self) -> &'static str {
        "uvx"
    }

    fn description(&self) -> &'static str {
        "Run zizmor through uvx from PyPI"
    }

    fn provision(&self, version: &ToolVersion) -> Result<ProvisionedTool> {
        let uvx = self.locate()?;
        info!(uvx = %uvx.display(), %version, "Using uvx");

        // uvx accepts `tool@latest` as well as `tool@<version>`
        let spec = format!("{ZIZMOR_BINARY}@{version}");
        Ok(ProvisionedTool::new(uvx).with_leading_args([spec]))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_uvx(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("uvx");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_provision_latest() {
        let dir = tempfile::tempdir().unwrap();
        let uvx = fake_uvx(dir.path());

        let provider = UvxToolProvider::with_search_path(dir.path());
        let tool = provider.provision(&ToolVersion::Latest).unwrap();

        assert_eq!(tool.program(), uvx);
        assert_eq!(tool.leading_args(), ["zizmor@latest"]);
        assert!(tool.workdir().is_none());
    }

    #[test]
    fn test_provision_pinned_version() {
        let dir = tempfile::tempdir().unwrap();
        fake_uvx(dir.path());

        let provider = UvxToolProvider::with_search_path(dir.path());
        let tool = provider
            .provision(&ToolVersion::Exact("1.5.2".into()))
            .unwrap();

        assert_eq!(tool.leading_args(), ["zizmor@1.5.2"]);
    }

    #[test]
    fn test_missing_uvx() {
        let dir = tempfile::tempdir().unwrap();
        let provider = UvxToolProvider::with_search_path(dir.path());

        let err = provider.provision(&ToolVersion::Latest).unwrap_err();
        assert_eq!(err.to_string(), "uvx not found in PATH");
    }

    #[test]
    fn test_name() {
        assert_eq!(UvxToolProvider::new().name(), "uvx");
    }
}
