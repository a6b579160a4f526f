//! Release archive unpacking.

use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use zizmor_action_core::{Error, Result};

/// Extract the top-level `binary` entry of a `.tar.gz` into `dest`.
///
/// Only that one entry is written, always as `dest/<binary>`, so entry paths
/// from the archive never influence where data lands.
pub fn extract_binary(data: &[u8], binary: &str, dest: &Path) -> Result<PathBuf> {
    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));

    let entries = archive
        .entries()
        .map_err(|e| Error::extraction(format!("Failed to read tar: {e}")))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::extraction(format!("Failed to read tar entry: {e}")))?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_path = entry
            .path()
            .map_err(|e| Error::extraction(format!("Invalid path in tar: {e}")))?;
        if !is_top_level(&entry_path, binary) {
            continue;
        }

        let dest_path = dest.join(binary);
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::extraction(format!("Failed to read '{binary}': {e}")))?;
        std::fs::write(&dest_path, &content)
            .map_err(|e| Error::io("Failed to write", &dest_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dest_path, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| Error::io("Failed to set permissions on", &dest_path, e))?;
        }

        return Ok(dest_path);
    }

    Err(Error::extraction(format!(
        "binary '{binary}' not found in archive"
    )))
}

/// `zizmor` or `./zizmor`, nothing nested.
fn is_top_level(path: &Path, binary: &str) -> bool {
    let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == binary
    )
}
