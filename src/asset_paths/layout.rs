//! Host view of where emitted assets live on disk and how documents address them.

use std::path::{Path, PathBuf};

use super::naming::{SCRIPT_ASSET_DIR, render_asset_path};
use super::public::public_asset_path;
use super::writer::{asset_destination, write_asset};
use crate::error::AssetError;
use crate::models::ResolvedAsset;

/// Borrowed view of the host settings needed to emit an asset.
#[derive(Debug, Clone, Copy)]
pub struct AssetLayout<'a> {
  /// Build output directory.
  pub outdir: &'a Path,
  /// Prefix applied to paths written into documents.
  pub public_path: Option<&'a str>,
  /// Naming template, see [`render_asset_path`].
  pub asset_names: &'a str,
}

/// Where a script will be written and how documents will refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
  /// Output of the naming template, e.g. `js/htmx.min-1a2b3c4d.js`.
  pub relative: String,
  /// Path substituted into the document.
  pub public_path: String,
  /// File the content is written to.
  pub output_path: PathBuf,
}

impl AssetLayout<'_> {
  /// Directory the rendered template is joined onto.
  ///
  /// A path-like public prefix such as `/static` is mirrored below the output directory so the
  /// written file sits where the document points. URL prefixes (`https://cdn...`, `//cdn...`)
  /// address another host and leave files directly under the output directory.
  pub fn asset_root(&self) -> PathBuf {
    match self.public_path {
      Some(prefix) if !prefix.contains("://") && !prefix.starts_with("//") => {
        asset_destination(self.outdir, prefix)
      }
      _ => self.outdir.to_path_buf(),
    }
  }

  /// Compute the on-disk and public paths for a script without touching disk.
  pub fn locate(&self, file_name: &str, content: &[u8]) -> Result<AssetLocation, AssetError> {
    let relative = render_asset_path(self.asset_names, SCRIPT_ASSET_DIR, file_name, content)?;
    Ok(AssetLocation {
      public_path: public_asset_path(self.public_path, &relative),
      output_path: asset_destination(&self.asset_root(), &relative),
      relative,
    })
  }

  /// Write `content` to a previously computed location.
  pub async fn write(&self, location: AssetLocation, content: Vec<u8>) -> Result<ResolvedAsset, AssetError> {
    let output_path = write_asset(&self.asset_root(), &location.relative, &content).await?;
    let file_name = location
      .relative
      .rsplit('/')
      .next()
      .unwrap_or(location.relative.as_str())
      .to_string();

    Ok(ResolvedAsset {
      content,
      file_name,
      output_path,
      public_path: location.public_path,
    })
  }

  /// Name, write and address a resolved script.
  pub async fn emit(&self, file_name: &str, content: Vec<u8>) -> Result<ResolvedAsset, AssetError> {
    let location = self.locate(file_name, &content)?;
    self.write(location, content).await
  }
}
