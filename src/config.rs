//! Project configuration loader and the host build settings derived from it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset_paths::{AssetLayout, DEFAULT_ASSET_NAMES};
use crate::error::ConfigError;
use crate::models::RewriteOptions;

/// File name looked up in the project root by [`BundlerConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "script-bundle.config.json";

/// Build settings owned by the host: where assets go and how they are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
  /// Output directory. Without one, scripts can only be inlined.
  pub outdir: Option<PathBuf>,
  /// Prefix for paths written into documents.
  pub public_path: Option<String>,
  /// Asset naming template with `[dir]`, `[name]`, `[hash]` and `[ext]` placeholders.
  pub asset_names: String,
  /// Project roots whose `node_modules` are searched for `npm:` references.
  pub module_roots: Vec<PathBuf>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      outdir: None,
      public_path: None,
      asset_names: DEFAULT_ASSET_NAMES.into(),
      module_roots: Vec::new(),
    }
  }
}

impl BuildConfig {
  /// Borrow the settings needed to emit assets, or `None` when no output directory is set.
  pub fn asset_layout(&self) -> Option<AssetLayout<'_>> {
    self.outdir.as_deref().map(|outdir| AssetLayout {
      outdir,
      public_path: self.public_path.as_deref(),
      asset_names: &self.asset_names,
    })
  }
}

/// Discoverable project configuration describing sources, output and rewrite behaviour.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct BundlerConfig {
  /// Directory scanned for JSX/TSX sources.
  pub src_dir: String,
  /// Build output directory.
  pub outdir: Option<String>,
  /// Prefix for emitted asset paths.
  pub public_path: Option<String>,
  /// Asset naming template.
  pub asset_names: String,
  /// Embed scripts instead of emitting assets.
  pub inline: bool,
  /// Log per-reference progress at `info`.
  pub verbose: bool,
  /// File extensions handled by the plugin, without the leading dot.
  pub extensions: Vec<String>,
  /// Extra project roots searched for `node_modules`.
  pub module_roots: Vec<String>,
}

impl Default for BundlerConfig {
  fn default() -> Self {
    Self {
      src_dir: "src".into(),
      outdir: Some("dist".into()),
      public_path: None,
      asset_names: DEFAULT_ASSET_NAMES.into(),
      inline: false,
      verbose: false,
      extensions: vec!["jsx".into(), "tsx".into()],
      module_roots: Vec::new(),
    }
  }
}

impl BundlerConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// When the configuration file does not exist or fails to parse we fall back to default values
  /// so callers can continue with the conventional layout.
  pub fn discover(project_dir: &Path) -> Self {
    let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(ConfigError::Io { .. }) => Self::default(),
      Err(err) => {
        tracing::warn!("{err}; using default configuration");
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Host build settings, with relative paths anchored at `project_dir`.
  pub fn to_build_config(&self, project_dir: &Path) -> BuildConfig {
    let mut module_roots: Vec<PathBuf> = self
      .module_roots
      .iter()
      .map(|root| project_dir.join(root))
      .collect();
    module_roots.push(project_dir.to_path_buf());

    BuildConfig {
      outdir: self.outdir.as_ref().map(|outdir| project_dir.join(outdir)),
      public_path: self.public_path.clone(),
      asset_names: self.asset_names.clone(),
      module_roots,
    }
  }

  /// Rewrite options described by this configuration.
  pub fn to_options(&self) -> RewriteOptions {
    RewriteOptions {
      verbose: self.verbose,
      inline: self.inline,
      ..RewriteOptions::default()
    }
  }

  /// Path to the source directory.
  pub fn src_dir_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.src_dir)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn discover_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    assert_eq!(BundlerConfig::discover(dir.path()), BundlerConfig::default());

    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ nope").unwrap();
    assert_eq!(BundlerConfig::discover(dir.path()), BundlerConfig::default());
  }

  #[test]
  fn reads_partial_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(DEFAULT_CONFIG_FILE),
      r#"{"outdir": "build", "publicPath": "/static", "inline": true}"#,
    )
    .unwrap();

    let config = BundlerConfig::discover(dir.path());
    assert_eq!(config.outdir.as_deref(), Some("build"));
    assert_eq!(config.public_path.as_deref(), Some("/static"));
    assert!(config.inline);
    assert_eq!(config.asset_names, DEFAULT_ASSET_NAMES);
    assert_eq!(config.extensions, vec!["jsx".to_string(), "tsx".to_string()]);
  }

  #[test]
  fn from_path_reports_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    assert!(matches!(BundlerConfig::from_path(&path), Err(ConfigError::Io { .. })));

    fs::write(&path, "42").unwrap();
    assert!(matches!(BundlerConfig::from_path(&path), Err(ConfigError::Parse { .. })));
  }

  #[test]
  fn anchors_paths_at_project_dir() {
    let config = BundlerConfig {
      module_roots: vec!["../shared".into()],
      ..BundlerConfig::default()
    };
    let project = Path::new("/work/site");
    let build = config.to_build_config(project);

    assert_eq!(build.outdir, Some(project.join("dist")));
    assert_eq!(build.module_roots, vec![project.join("../shared"), project.to_path_buf()]);
    assert_eq!(config.src_dir_path(project), project.join("src"));
  }

  #[test]
  fn asset_layout_requires_outdir() {
    assert!(BuildConfig::default().asset_layout().is_none());

    let config = BuildConfig {
      outdir: Some(PathBuf::from("dist")),
      public_path: Some("/static".into()),
      ..BuildConfig::default()
    };
    let layout = config.asset_layout().unwrap();
    assert_eq!(layout.outdir, Path::new("dist"));
    assert_eq!(layout.public_path, Some("/static"));
  }
}
