//! File-load hook exposing the rewriter to a host build.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::rewrite::{DocumentRewrite, ScriptRewriter};

/// Name reported by the plugin and used as the log target prefix.
pub const PLUGIN_NAME: &str = "jsx-script-bundle";

/// Filter applied when no extensions are configured.
const DEFAULT_FILTER: &str = r"\.(jsx|tsx)$";

/// Loader hint returned alongside transformed contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
  /// JavaScript with JSX.
  Jsx,
  /// TypeScript with JSX.
  Tsx,
  /// Plain JavaScript.
  Js,
  /// Plain TypeScript.
  Ts,
}

impl Loader {
  /// Pick the loader matching a file's extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    match path.extension()?.to_str()? {
      "jsx" => Some(Self::Jsx),
      "tsx" => Some(Self::Tsx),
      "js" | "mjs" | "cjs" => Some(Self::Js),
      "ts" | "mts" | "cts" => Some(Self::Ts),
      _ => None,
    }
  }
}

/// Arguments handed to the load hook.
#[derive(Debug, Clone)]
pub struct OnLoadArgs {
  /// Path of the file being loaded.
  pub path: PathBuf,
}

/// Transformed file returned from the load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnLoadResult {
  /// Rewritten source text.
  pub contents: String,
  /// Loader the host should use for `contents`.
  pub loader: Option<Loader>,
}

/// Load hook that rewrites remote and `npm:` script tags in matching source files.
pub struct ScriptBundlerPlugin {
  rewriter: ScriptRewriter,
  filter: Regex,
}

impl ScriptBundlerPlugin {
  /// Wrap `rewriter` with the default `.jsx`/`.tsx` filter.
  pub fn new(rewriter: ScriptRewriter) -> Self {
    Self {
      rewriter,
      filter: Regex::new(DEFAULT_FILTER).expect("invalid default filter regex"),
    }
  }

  /// Wrap `rewriter` with a filter accepting the given extensions (without leading dots).
  pub fn for_extensions(rewriter: ScriptRewriter, extensions: &[String]) -> Result<Self> {
    let extensions: Vec<String> = extensions
      .iter()
      .map(|ext| ext.trim().trim_start_matches('.'))
      .filter(|ext| !ext.is_empty())
      .map(regex::escape)
      .collect();
    if extensions.is_empty() {
      return Ok(Self::new(rewriter));
    }

    let pattern = format!(r"\.({})$", extensions.join("|"));
    let filter =
      Regex::new(&pattern).with_context(|| format!("invalid extension filter {pattern}"))?;
    Ok(Self { rewriter, filter })
  }

  /// Plugin name.
  pub fn name(&self) -> &'static str {
    PLUGIN_NAME
  }

  /// Path filter the host should apply before calling [`Self::on_load`].
  pub fn filter(&self) -> &Regex {
    &self.filter
  }

  /// Whether the filter accepts `path`.
  pub fn matches(&self, path: &Path) -> bool {
    self.filter.is_match(&path.to_string_lossy())
  }

  /// Underlying rewriter.
  pub fn rewriter(&self) -> &ScriptRewriter {
    &self.rewriter
  }

  /// Source text for `path`, preferring a configured override over the filesystem.
  pub async fn load_source(&self, path: &Path) -> Result<String> {
    if let Some(contents) = self.rewriter.options().source_overrides.get(path) {
      return Ok(contents.clone());
    }
    tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("failed to read {}", path.display()))
  }

  /// Load and rewrite `path`, reporting the outcome of every reference.
  pub async fn transform(&self, path: &Path) -> Result<DocumentRewrite> {
    let contents = self.load_source(path).await?;
    Ok(self.rewriter.rewrite_document(&contents, path).await)
  }

  /// Load hook: return the rewritten contents of `args.path` and its loader hint.
  pub async fn on_load(&self, args: OnLoadArgs) -> Result<OnLoadResult> {
    let rewrite = self.transform(&args.path).await?;
    Ok(OnLoadResult {
      contents: rewrite.contents,
      loader: Loader::from_path(&args.path),
    })
  }
}
