//! Addresses written into documents for emitted assets.

/// Produce the path written into the document for an emitted asset.
///
/// The public path prefix is joined to the output-relative path with exactly one slash. Without a
/// prefix the result is rooted at `/`. Backslashes are normalised so paths produced on Windows
/// still form valid URLs.
pub fn public_asset_path(public_path: Option<&str>, relative_path: &str) -> String {
  let prefix = public_path.unwrap_or_default().trim_end_matches('/');
  let relative = relative_path.trim_start_matches('/');
  format!("{prefix}/{relative}").replace('\\', "/")
}

#[cfg(test)]
mod tests {
  use super::public_asset_path;

  #[test]
  fn roots_paths_without_prefix() {
    assert_eq!(public_asset_path(None, "js/htmx.min.js"), "/js/htmx.min.js");
    assert_eq!(public_asset_path(Some(""), "js/htmx.min.js"), "/js/htmx.min.js");
    assert_eq!(public_asset_path(Some("/"), "js/htmx.min.js"), "/js/htmx.min.js");
  }

  #[test]
  fn joins_prefix_with_single_slash() {
    assert_eq!(public_asset_path(Some("/static/"), "/js/a.js"), "/static/js/a.js");
    assert_eq!(
      public_asset_path(Some("https://cdn.example.com/assets"), "js/a.js"),
      "https://cdn.example.com/assets/js/a.js"
    );
  }

  #[test]
  fn normalises_backslashes_from_windows_inputs() {
    assert_eq!(public_asset_path(Some("/static"), "js\\a.js"), "/static/js/a.js");
  }
}
