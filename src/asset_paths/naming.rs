//! Expanding the asset naming template and hashing script content.

use sha2::{Digest, Sha256};

use crate::error::AssetError;

/// Template used when the host does not configure one.
pub const DEFAULT_ASSET_NAMES: &str = "[dir]/[name]-[hash].[ext]";

/// Value substituted for `[dir]`.
pub const SCRIPT_ASSET_DIR: &str = "js";

/// Number of hex characters of the content digest kept in `[hash]`.
pub const HASH_LENGTH: usize = 8;

/// Truncated SHA-256 digest of `content`, lowercase hex.
pub fn content_hash(content: &[u8]) -> String {
  let mut hash = hex::encode(Sha256::digest(content));
  hash.truncate(HASH_LENGTH);
  hash
}

/// Split a file name into base name and extension at the last `.`.
///
/// Names without a usable extension are treated as JavaScript.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
  match file_name.rsplit_once('.') {
    Some((name, ext)) if !name.is_empty() && !ext.is_empty() => (name, ext),
    _ => (file_name, "js"),
  }
}

/// Expand an asset naming template into an output-relative path.
///
/// Recognised placeholders are `[dir]`, `[name]`, `[hash]` and `[ext]`. The result always uses
/// forward slashes and never contains empty or `.` segments, so templates such as
/// `[dir]/[name].[ext]` with an empty directory still yield a clean relative path.
pub fn render_asset_path(
  template: &str,
  dir: &str,
  file_name: &str,
  content: &[u8],
) -> Result<String, AssetError> {
  let (name, ext) = split_file_name(file_name);
  let mut rendered = template
    .replace("[dir]", dir)
    .replace("[name]", name)
    .replace("[ext]", ext);
  if rendered.contains("[hash]") {
    rendered = rendered.replace("[hash]", &content_hash(content));
  }

  let normalised = rendered
    .replace('\\', "/")
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != ".")
    .collect::<Vec<_>>()
    .join("/");

  if normalised.is_empty() {
    return Err(AssetError::EmptyPath(template.to_string()));
  }
  Ok(normalised)
}
