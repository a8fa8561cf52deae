use crate::error::{OcrError, Result};
use flate2::read::GzDecoder;
use std::io::{self, Read};
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// Writes the first regular file named exactly `entry_name` in a `.tar.gz` to `dest`.
///
/// The bytes land in a temporary file next to `dest`, get mode 0755, and are
/// then renamed into place, so `dest` is either untouched or complete.
pub fn extract_named_entry(archive_bytes: &[u8], entry_name: &str, dest: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    let mut entries = archive
        .entries()
        .map_err(|e| OcrError::Artifact(format!("unreadable archive: {e}")))?;

    let mut entry = loop {
        let Some(entry) = entries.next() else {
            return Err(OcrError::Artifact(format!(
                "archive does not contain '{entry_name}'"
            )));
        };
        let entry =
            entry.map_err(|e| OcrError::Artifact(format!("corrupt archive entry: {e}")))?;
        let is_file = entry.header().entry_type().is_file();
        if is_file && *entry.path_bytes() == *entry_name.as_bytes() {
            break entry;
        }
        debug!("skipping archive entry {}", String::from_utf8_lossy(&entry.path_bytes()));
    };

    stage_executable(&mut entry, dest)
}

fn stage_executable<R: Read>(src: &mut R, dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    io::copy(src, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o755))?;
    }

    tmp.persist(dest).map_err(|e| OcrError::Io(e.error))?;
    Ok(())
}
