//! Artifact authenticity checks.
//!
//! Two independent checks run before an archive is unpacked: the SHA-256
//! digest GitHub records for the asset, and the build provenance attestation
//! published alongside the release.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};
use zizmor_action_core::{Error, Result};

/// Verifies that an artifact was built by the expected repository.
pub trait AttestationVerifier {
    /// Check `artifact` against attestations published for `repository`.
    ///
    /// Any error means the artifact must not be used.
    fn verify(&self, artifact: &Path, repository: &str, token: &SecretString) -> Result<()>;
}

/// Verifies attestations with `gh attestation verify`.
#[derive(Debug, Default)]
pub struct GhAttestationVerifier {
    search_path: Option<OsString>,
}

impl GhAttestationVerifier {
    /// Find `gh` on the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find `gh` on an explicit `PATH`-style list.
    #[must_use]
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => which::which_in("gh", Some(paths), "."),
            None => which::which("gh"),
        };
        found.map_err(|_| Error::ToolNotFound { tool: "gh" })
    }
}

impl AttestationVerifier for GhAttestationVerifier {
    fn verify(&self, artifact: &Path, repository: &str, token: &SecretString) -> Result<()> {
        let gh = self.locate()?;
        debug!(gh = %gh.display(), artifact = %artifact.display(), %repository, "Verifying attestation");

        let output = Command::new(&gh)
            .arg("attestation")
            .arg("verify")
            .arg(artifact)
            .arg("--repo")
            .arg(repository)
            .env("GH_TOKEN", token.expose_secret())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: gh.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::verification(format!(
                "gh attestation verify failed for {} ({}): {}",
                artifact.display(),
                output.status,
                stderr.trim()
            )));
        }

        info!(artifact = %artifact.display(), %repository, "Attestation verified");
        Ok(())
    }
}

/// Compare `data` against a GitHub asset digest of the form `sha256:<hex>`.
pub fn verify_digest(expected: &str, data: &[u8]) -> Result<()> {
    let Some(expected_hex) = expected.strip_prefix("sha256:") else {
        return Err(Error::verification(format!(
            "unsupported digest algorithm in '{expected}'"
        )));
    };

    let actual = hex::encode(Sha256::digest(data));
    if !actual.eq_ignore_ascii_case(expected_hex) {
        return Err(Error::verification(format!(
            "digest mismatch: expected sha256:{expected_hex}, got sha256:{actual}"
        )));
    }

    debug!(%actual, "Digest verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_digest_matches() {
        assert!(verify_digest(&format!("sha256:{HELLO}"), b"hello").is_ok());
        assert!(verify_digest(&format!("sha256:{}", HELLO.to_uppercase()), b"hello").is_ok());
    }

    #[test]
    fn test_digest_mismatch() {
        let err = verify_digest(&format!("sha256:{HELLO}"), b"goodbye").unwrap_err();
        assert!(matches!(err, Error::Verification { .. }));
        assert!(err.to_string().contains("digest mismatch"));
    }

    #[test]
    fn test_unknown_algorithm_fails_closed() {
        let err = verify_digest("md5:5d41402abc4b2a76b9719d911017c592", b"hello").unwrap_err();
        assert!(err.to_string().contains("unsupported digest algorithm"));
    }

    #[test]
    fn test_missing_gh() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = GhAttestationVerifier::with_search_path(dir.path());
        let token = SecretString::from("t".to_string());

        let err = verifier
            .verify(Path::new("/tmp/zizmor.tar.gz"), "zizmorcore/zizmor", &token)
            .unwrap_err();
        assert_eq!(err.to_string(), "gh not found in PATH");
    }

    #[cfg(unix)]
    fn fake_gh(dir: &Path, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("gh");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_gh_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("args");
        fake_gh(
            dir.path(),
            &format!("echo \"$@ token=$GH_TOKEN\" > '{}'", log.display()),
        );
        let verifier = GhAttestationVerifier::with_search_path(dir.path());
        let token = SecretString::from("ghs_abc".to_string());

        verifier
            .verify(Path::new("/tmp/z.tar.gz"), "zizmorcore/zizmor", &token)
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&log).unwrap(),
            "attestation verify /tmp/z.tar.gz --repo zizmorcore/zizmor token=ghs_abc\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_gh_rejection_is_verification_error() {
        let dir = tempfile::tempdir().unwrap();
        fake_gh(dir.path(), "echo 'no matching attestations found' >&2; exit 1");
        let verifier = GhAttestationVerifier::with_search_path(dir.path());
        let token = SecretString::from("t".to_string());

        let err = verifier
            .verify(Path::new("/tmp/z.tar.gz"), "zizmorcore/zizmor", &token)
            .unwrap_err();
        assert!(matches!(err, Error::Verification { .. }));
        assert!(err.to_string().contains("no matching attestations found"));
    }
}
