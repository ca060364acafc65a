//! Persisting emitted assets to disk.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::AssetError;

/// Join a forward-slash relative path onto `root`, dropping empty segments.
pub fn asset_destination(root: &Path, relative_path: &str) -> PathBuf {
  relative_path
    .split('/')
    .filter(|segment| !segment.is_empty())
    .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Write `content` to `relative_path` below `outdir`, creating parent directories.
///
/// The write is skipped when the destination already holds identical bytes, which is the common
/// case when several documents reference the same dependency.
pub async fn write_asset(
  outdir: &Path,
  relative_path: &str,
  content: &[u8],
) -> Result<PathBuf, AssetError> {
  let destination = asset_destination(outdir, relative_path);

  if let Ok(existing) = fs::read(&destination).await
    && existing == content
  {
    return Ok(destination);
  }

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).await.map_err(|source| AssetError::Io {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  fs::write(&destination, content)
    .await
    .map_err(|source| AssetError::Io {
      path: destination.clone(),
      source,
    })?;

  Ok(destination)
}
