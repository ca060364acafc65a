//! Data structures produced while rewriting script references in a document.

use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;

/// Prefix marking a package-style module specifier.
pub const MODULE_SCHEME: &str = "npm:";

/// Where a matched script tag points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
  /// `http://` or `https://` URL fetched over the network.
  Remote(String),
  /// Bare module specifier with the `npm:` prefix removed.
  Module(String),
}

impl ScriptSource {
  /// Classify a raw `src` value. Returns `None` for local references.
  pub fn classify(reference: &str) -> Option<Self> {
    if reference.starts_with("http://") || reference.starts_with("https://") {
      return Some(Self::Remote(reference.to_string()));
    }

    reference
      .strip_prefix(MODULE_SCHEME)
      .filter(|specifier| !specifier.is_empty())
      .map(|specifier| Self::Module(specifier.to_string()))
  }

  /// Short label used in diagnostics.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Remote(_) => "remote",
      Self::Module(_) => "module",
    }
  }
}

/// How the matched tag was terminated in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTerminator {
  /// `<script ... />`
  SelfClosing,
  /// `<script ...></script>`
  ClosingTag,
}

impl TagTerminator {
  /// Literal text of the terminator.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::SelfClosing => "/>",
      Self::ClosingTag => "</script>",
    }
  }
}

/// A single `<script>` occurrence that references a remote or module script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReference {
  /// Full matched tag text.
  pub matched: String,
  /// Byte range of `matched` within the document.
  pub span: Range<usize>,
  /// The `src` value exactly as written, including any `npm:` prefix.
  pub reference: String,
  /// Byte range of `reference` relative to the start of `matched`.
  pub reference_span: Range<usize>,
  /// Byte range of the whole `src="..."` attribute (with its leading whitespace) relative to
  /// the start of `matched`.
  pub attribute_span: Range<usize>,
  /// Terminator used by the tag.
  pub terminator: TagTerminator,
  /// Classification of `reference`.
  pub source: ScriptSource,
}

/// Script bytes that were resolved and, unless inlined, emitted into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
  /// Raw script content.
  pub content: Vec<u8>,
  /// File name derived from the naming template, e.g. `htmx.min-1a2b3c4d.js`.
  pub file_name: String,
  /// Location of the written file on disk.
  pub output_path: PathBuf,
  /// Path substituted into the document, e.g. `/js/htmx.min-1a2b3c4d.js`.
  pub public_path: String,
}

/// Caller-facing options for a rewrite pass.
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
  /// Promote per-reference progress messages to `info` level.
  pub verbose: bool,
  /// Embed script content in the tag instead of emitting an asset.
  pub inline: bool,
  /// Source text to use in place of reading the listed paths from disk.
  ///
  /// Lets the rewrite run on output of a previous transform without a round trip through the
  /// filesystem.
  pub source_overrides: HashMap<PathBuf, String>,
}

impl RewriteOptions {
  /// Register replacement text for a source path.
  pub fn with_source_override(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
    self.source_overrides.insert(path.into(), contents.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_remote_urls() {
    assert_eq!(
      ScriptSource::classify("https://unpkg.com/hyperscript.org@0.9.12"),
      Some(ScriptSource::Remote("https://unpkg.com/hyperscript.org@0.9.12".into()))
    );
    assert_eq!(
      ScriptSource::classify("http://example.com/a.js"),
      Some(ScriptSource::Remote("http://example.com/a.js".into()))
    );
  }

  #[test]
  fn strips_module_scheme() {
    assert_eq!(
      ScriptSource::classify("npm:htmx.org"),
      Some(ScriptSource::Module("htmx.org".into()))
    );
  }

  #[test]
  fn ignores_local_and_empty_references() {
    assert_eq!(ScriptSource::classify("./local.js"), None);
    assert_eq!(ScriptSource::classify("/static/app.js"), None);
    assert_eq!(ScriptSource::classify("npm:"), None);
  }

  #[test]
  fn source_overrides_are_keyed_by_path() {
    let options = RewriteOptions::default().with_source_override("src/app.tsx", "<div />");
    assert_eq!(
      options.source_overrides.get(&PathBuf::from("src/app.tsx")).map(String::as_str),
      Some("<div />")
    );
  }
}
