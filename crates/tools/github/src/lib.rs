//! GitHub Releases provisioning for zizmor-action.
//!
//! Fetches zizmor's prebuilt binaries from GitHub Releases:
//! - Asset selection by platform triple (`zizmor-<triple>.tar.gz`)
//! - Digest and build provenance verification before anything is unpacked
//! - Extraction of the single top-level `zizmor` executable
//!
//! Every phase gets its own scratch directory under `RUNNER_TEMP`. The
//! download directory is gone by the time [`ToolProvider::provision`]
//! returns; the install directory lives as long as the [`ProvisionedTool`].

mod archive;
mod attestation;

pub use archive::extract_binary;
pub use attestation::{AttestationVerifier, GhAttestationVerifier, verify_digest};

use reqwest::blocking::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use zizmor_action_core::inputs::ToolVersion;
use zizmor_action_core::tools::{Platform, ProvisionedTool, ToolProvider, ZIZMOR_BINARY};
use zizmor_action_core::{Error, Result};

/// Public GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository zizmor releases are published from.
pub const DEFAULT_REPOSITORY: &str = "zizmorcore/zizmor";

/// GitHub release metadata from the API.
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    assets: Vec<Asset>,
}

/// GitHub release asset.
#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
    /// `sha256:<hex>`, present on assets uploaded since mid-2025.
    #[serde(default)]
    digest: Option<String>,
}

/// Release asset name for a platform.
#[must_use]
pub fn asset_name(platform: &Platform) -> String {
    format!("{ZIZMOR_BINARY}-{}.tar.gz", platform.triple())
}

/// Tool provider for zizmor's GitHub Releases.
pub struct GitHubReleaseProvider {
    client: Client,
    api_url: String,
    repository: String,
    token: SecretString,
    platform: Platform,
    scratch_root: PathBuf,
    verifier: Box<dyn AttestationVerifier>,
}

impl std::fmt::Debug for GitHubReleaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubReleaseProvider")
            .field("api_url", &self.api_url)
            .field("repository", &self.repository)
            .field("platform", &self.platform)
            .field("scratch_root", &self.scratch_root)
            .finish_non_exhaustive()
    }
}

impl GitHubReleaseProvider {
    /// Create a provider for the current host platform.
    ///
    /// Fails on hosts zizmor publishes no binaries for.
    pub fn new(token: SecretString, scratch_root: impl Into<PathBuf>) -> Result<Self> {
        let platform = Platform::current()?;
        let client = Client::builder()
            .user_agent(concat!("zizmor-action/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::download(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            token,
            platform,
            scratch_root: scratch_root.into(),
            verifier: Box::new(GhAttestationVerifier::new()),
        })
    }

    /// Use a different API endpoint (GitHub Enterprise Server, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch releases from a different `owner/repo`.
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    /// Override the detected platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the attestation verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: impl AttestationVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-GitHub-Api-Version", "2022-11-28");

        let token = self.token.expose_secret();
        if token.is_empty() {
            request
        } else {
            request.bearer_auth(token)
        }
    }

    fn release_url(&self, version: &ToolVersion) -> String {
        match version {
            ToolVersion::Latest => {
                format!("{}/repos/{}/releases/latest", self.api_url, self.repository)
            }
            ToolVersion::Exact(v) => format!(
                "{}/repos/{}/releases/tags/v{}",
                self.api_url,
                self.repository,
                v.trim_start_matches('v')
            ),
        }
    }

    /// Fetch release information from GitHub API.
    fn fetch_release(&self, version: &ToolVersion) -> Result<Release> {
        let url = self.release_url(version);
        debug!(%url, "Fetching GitHub release");

        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|e| Error::download(format!("Failed to fetch release: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::download(format!(
                "Release not found: {} {} (HTTP {})",
                self.repository,
                version,
                response.status()
            )));
        }

        response
            .json()
            .map_err(|e| Error::download(format!("Failed to parse release: {e}")))
    }

    /// Download an asset from GitHub.
    fn download_asset(&self, asset: &Asset) -> Result<Vec<u8>> {
        debug!(url = %asset.browser_download_url, "Downloading GitHub asset");

        let response = self
            .authorized(self.client.get(&asset.browser_download_url))
            .header("Accept", "application/octet-stream")
            .send()
            .map_err(|e| Error::download(format!("Failed to download asset: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::download(format!(
                "Failed to download {} (HTTP {})",
                asset.name,
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| Error::download(format!("Failed to read asset: {e}")))
    }
}

impl ToolProvider for GitHubReleaseProvider {
    fn name(&self) -> &'static str {
        "release"
    }

    fn description(&self) -> &'static str {
        "Download verified zizmor binaries from GitHub Releases"
    }

    fn provision(&self, version: &ToolVersion) -> Result<ProvisionedTool> {
        info!(
            repository = %self.repository,
            %version,
            platform = %self.platform,
            "Resolving GitHub release"
        );

        let release = self.fetch_release(version)?;
        let wanted = asset_name(&self.platform);
        let Some(asset) = release.assets.iter().find(|a| a.name == wanted) else {
            let available: Vec<_> = release.assets.iter().map(|a| &a.name).collect();
            return Err(Error::download(format!(
                "Asset '{}' not found in release {}. Available: {:?}",
                wanted, release.tag_name, available
            )));
        };

        let data = self.download_asset(asset)?;

        let download_dir = scratch_dir(&self.scratch_root, "zizmor-download-")?;
        let archive_path = download_dir.path().join(&asset.name);
        std::fs::write(&archive_path, &data)
            .map_err(|e| Error::io("Failed to write", &archive_path, e))?;

        match &asset.digest {
            Some(digest) => verify_digest(digest, &data)?,
            None => warn!(asset = %asset.name, "Release asset has no recorded digest"),
        }
        self.verifier
            .verify(&archive_path, &self.repository, &self.token)?;

        let install_dir = scratch_dir(&self.scratch_root, "zizmor-install-")?;
        let binary = extract_binary(&data, ZIZMOR_BINARY, install_dir.path())?;
        drop(download_dir);

        info!(
            tag = %release.tag_name,
            asset = %asset.name,
            binary = %binary.display(),
            "Provisioned zizmor"
        );

        Ok(ProvisionedTool::new(binary).with_workdir(install_dir))
    }
}

fn scratch_dir(root: &Path, prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(root)
        .map_err(|e| Error::io("Failed to create directory in", root, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zizmor_action_core::tools::{Arch, Os};

    #[test]
    fn test_asset_name() {
        assert_eq!(
            asset_name(&Platform::new(Os::Linux, Arch::X86_64)),
            "zizmor-x86_64-unknown-linux-gnu.tar.gz"
        );
        assert_eq!(
            asset_name(&Platform::new(Os::Darwin, Arch::Arm64)),
            "zizmor-aarch64-apple-darwin.tar.gz"
        );
    }

    fn provider() -> GitHubReleaseProvider {
        GitHubReleaseProvider::new(SecretString::from(String::new()), "/tmp")
            .unwrap()
            .with_api_url("https://ghe.example.com/api/v3/")
    }

    #[test]
    fn test_release_url_latest() {
        assert_eq!(
            provider().release_url(&ToolVersion::Latest),
            "https://ghe.example.com/api/v3/repos/zizmorcore/zizmor/releases/latest"
        );
    }

    #[test]
    fn test_release_url_tag_tolerates_v_prefix() {
        let provider = provider().with_repository("fork/zizmor");
        for version in ["1.5.2", "v1.5.2"] {
            assert_eq!(
                provider.release_url(&ToolVersion::Exact(version.into())),
                "https://ghe.example.com/api/v3/repos/fork/zizmor/releases/tags/v1.5.2"
            );
        }
    }

    #[test]
    fn test_release_metadata_parses_without_digest() {
        let release: Release = serde_json::from_str(
            r#"{"tag_name":"v1.0.0","assets":[{"name":"a","browser_download_url":"https://x/a"}]}"#,
        )
        .unwrap();
        assert_eq!(release.assets[0].digest, None);
    }
}
