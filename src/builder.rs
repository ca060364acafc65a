//! Build orchestrator running the plugin over a source tree and writing the results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::ResolvedAsset;
use crate::plugin::{OnLoadArgs, ScriptBundlerPlugin};
use crate::scanning::{collect_source_files, relative_to};

/// Summary of one document written by the builder.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
  /// Source file that was read.
  pub source: PathBuf,
  /// Where the rewritten text was written.
  pub output: PathBuf,
  /// Number of script references found.
  pub references: usize,
  /// Number of references left unchanged because they failed or could not be emitted.
  pub unchanged: usize,
}

/// Outcome of a full build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
  /// Every processed document, in path order.
  pub documents: Vec<ProcessedDocument>,
  /// Every asset emitted, in document then match order. The same asset may appear more than
  /// once when several documents reference it.
  pub assets: Vec<ResolvedAsset>,
}

impl BuildReport {
  /// Number of references that were left as written across the build.
  pub fn unchanged_references(&self) -> usize {
    self.documents.iter().map(|document| document.unchanged).sum()
  }
}

/// High-level helper that rewrites every matching document below a source directory.
pub struct ScriptBundleBuilder {
  plugin: ScriptBundlerPlugin,
  src_dir: PathBuf,
  outdir: PathBuf,
}

impl ScriptBundleBuilder {
  /// Create a builder reading from `src_dir` and writing documents below `outdir`.
  pub fn new(plugin: ScriptBundlerPlugin, src_dir: impl Into<PathBuf>, outdir: impl Into<PathBuf>) -> Self {
    Self {
      plugin,
      src_dir: src_dir.into(),
      outdir: outdir.into(),
    }
  }

  /// Process every matching file, one document at a time.
  pub async fn build(&self) -> Result<BuildReport> {
    let sources = collect_source_files(&self.src_dir, &[self.outdir.clone()], &|path: &Path| {
      self.plugin.matches(path)
    });
    tracing::debug!(
      count = sources.len(),
      src_dir = %self.src_dir.display(),
      "collected source documents"
    );

    let mut report = BuildReport::default();
    for source in sources {
      let rewrite = self.plugin.transform(&source).await?;
      let output = self.outdir.join(relative_to(&self.src_dir, &source));
      write_document(&output, &rewrite.contents).await?;

      report.documents.push(ProcessedDocument {
        source,
        output,
        references: rewrite.outcomes.len(),
        unchanged: rewrite.unchanged(),
      });
      report.assets.extend(rewrite.assets().cloned());
    }

    Ok(report)
  }

  /// Run the load hook for a single file, e.g. from a watcher.
  pub async fn load(&self, path: &Path) -> Result<String> {
    let result = self
      .plugin
      .on_load(OnLoadArgs {
        path: path.to_path_buf(),
      })
      .await?;
    Ok(result.contents)
  }
}

async fn write_document(path: &Path, contents: &str) -> Result<()> {
  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  tokio::fs::write(path, contents)
    .await
    .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset_paths::content_hash;
  use crate::config::BuildConfig;
  use crate::models::RewriteOptions;
  use crate::resolve::testing::{StaticFetcher, StaticResolver};
  use crate::rewrite::ScriptRewriter;
  use std::fs;
  use tempfile::tempdir;

  #[tokio::test]
  async fn rewrites_source_tree_into_outdir() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    let src = root.join("src");
    let outdir = root.join("dist");
    let htmx = root.join("node_modules/htmx.org/dist/htmx.min.js");

    fs::create_dir_all(src.join("routes"))?;
    fs::create_dir_all(htmx.parent().unwrap())?;
    fs::write(&htmx, "htmx")?;
    fs::write(
      src.join("layout.tsx"),
      "<head><script src=\"npm:htmx.org\" /><script src=\"https://down.example.com/x.js\" /></head>",
    )?;
    fs::write(src.join("routes/page.jsx"), "<main>plain</main>")?;
    fs::write(src.join("routes/notes.md"), "<script src=\"npm:htmx.org\" />")?;

    let config = BuildConfig {
      outdir: Some(outdir.clone()),
      ..BuildConfig::default()
    };
    let rewriter = ScriptRewriter::new(RewriteOptions::default(), config)
      .with_fetcher(StaticFetcher::default())
      .with_resolver(StaticResolver::default().with("htmx.org", &htmx));
    let builder = ScriptBundleBuilder::new(ScriptBundlerPlugin::new(rewriter), &src, &outdir);

    let report = builder.build().await?;

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.unchanged_references(), 1);

    let layout = fs::read_to_string(outdir.join("layout.tsx"))?;
    let htmx_public = format!("/js/htmx.min-{}.js", content_hash(b"htmx"));
    assert!(layout.contains(&format!("<script src=\"{htmx_public}\" />")));
    assert!(layout.contains("<script src=\"https://down.example.com/x.js\" />"));
    assert_eq!(fs::read_to_string(outdir.join("routes/page.jsx"))?, "<main>plain</main>");
    assert!(!outdir.join("routes/notes.md").exists());
    assert_eq!(fs::read_to_string(&report.assets[0].output_path)?, "htmx");

    Ok(())
  }

  #[tokio::test]
  async fn load_returns_rewritten_contents() -> Result<()> {
    let dir = tempdir()?;
    let page = dir.path().join("page.tsx");
    fs::write(&page, "<p>nothing to do</p>")?;

    let rewriter = ScriptRewriter::new(RewriteOptions::default(), BuildConfig::default());
    let builder = ScriptBundleBuilder::new(
      ScriptBundlerPlugin::new(rewriter),
      dir.path(),
      dir.path().join("dist"),
    );

    assert_eq!(builder.load(&page).await?, "<p>nothing to do</p>");
    Ok(())
  }
}
