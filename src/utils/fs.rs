//! File system utilities for writing generated artifacts.
//!
//! Every artifact is written to a sibling temporary file first and then
//! renamed over the destination, so a reader never observes a half-written
//! descriptor and a failed run leaves the previous output intact.

use crate::error::Result;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Writes `contents` to `path` atomically, creating parent directories.
///
/// An existing file at `path` is replaced.
pub async fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = write_then_rename(&temp_path, path, contents.as_ref()).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    log::debug!("Wrote {}", path.display());
    Ok(())
}

async fn write_then_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp_path, path).await
}

/// `path` made absolute against the current directory, without touching
/// the file system.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path.absolutize()?.into_owned())
}

/// `<dir>/.<name>.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
