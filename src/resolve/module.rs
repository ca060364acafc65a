//! Resolving bare module specifiers against `node_modules` trees.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ResolveError;

const NODE_MODULES: &str = "node_modules";
const PACKAGE_MANIFEST: &str = "package.json";
const DEFAULT_ENTRY: &str = "index.js";

/// Export conditions consulted, in priority order, when `exports` maps to a condition object.
const EXPORT_CONDITIONS: [&str; 4] = ["browser", "import", "default", "require"];

/// Module resolution capability used for `npm:` script references.
pub trait ModuleResolver: Send + Sync {
  /// Map `specifier` (without the `npm:` prefix) to a local file, searching from `from_dir`.
  fn resolve(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf, ResolveError>;
}

/// Node-style resolver walking `node_modules` directories upward from the importing file.
#[derive(Debug, Clone, Default)]
pub struct NodeModulesResolver {
  extra_roots: Vec<PathBuf>,
}

/// Subset of `package.json` consulted for the package entry point.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
  #[serde(default)]
  exports: Option<Value>,
  #[serde(default)]
  main: Option<String>,
}

impl NodeModulesResolver {
  /// Resolver that only searches upward from each document.
  pub fn new() -> Self {
    Self::default()
  }

  /// Additional project roots whose `node_modules` are searched after the upward walk.
  pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>) -> Self {
    Self {
      extra_roots: roots.into_iter().collect(),
    }
  }

  fn search_dirs<'a>(&'a self, from_dir: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
    from_dir
      .ancestors()
      .map(|dir| dir.join(NODE_MODULES))
      .chain(self.extra_roots.iter().map(|root| root.join(NODE_MODULES)))
  }
}

impl ModuleResolver for NodeModulesResolver {
  fn resolve(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf, ResolveError> {
    let (package, subpath) = split_specifier(specifier)?;

    let package_dir = self
      .search_dirs(from_dir)
      .map(|dir| dir.join(package))
      .find(|candidate| candidate.is_dir())
      .ok_or_else(|| ResolveError::NotFound {
        specifier: specifier.to_string(),
      })?;

    let candidates = match subpath {
      Some(subpath) => subpath_candidates(&package_dir, subpath),
      None => package_entry_candidates(&package_dir)?,
    };

    candidates
      .into_iter()
      .find(|candidate| candidate.is_file())
      .ok_or_else(|| ResolveError::MissingEntry {
        specifier: specifier.to_string(),
        package_dir,
      })
  }
}

/// Split a specifier into its package name and optional subpath.
///
/// Scoped packages keep their scope: `@scope/pkg/dist/a.js` yields `("@scope/pkg",
/// Some("dist/a.js"))`.
pub fn split_specifier(specifier: &str) -> Result<(&str, Option<&str>), ResolveError> {
  let invalid = || ResolveError::InvalidSpecifier(specifier.to_string());
  let trimmed = specifier.trim();
  if trimmed.is_empty() || trimmed.starts_with('.') || trimmed.starts_with('/') {
    return Err(invalid());
  }

  let name_end = if trimmed.starts_with('@') {
    let scope_end = trimmed.find('/').ok_or_else(invalid)?;
    if scope_end == 1 {
      return Err(invalid());
    }
    trimmed[scope_end + 1..]
      .find('/')
      .map_or(trimmed.len(), |offset| scope_end + 1 + offset)
  } else {
    trimmed.find('/').unwrap_or(trimmed.len())
  };

  let package = &trimmed[..name_end];
  if package.ends_with('/') {
    return Err(invalid());
  }
  let subpath = trimmed[name_end..].trim_matches('/');
  Ok((package, (!subpath.is_empty()).then_some(subpath)))
}

fn subpath_candidates(package_dir: &Path, subpath: &str) -> Vec<PathBuf> {
  let direct = package_dir.join(subpath);
  vec![
    direct.clone(),
    package_dir.join(format!("{subpath}.js")),
    direct.join(DEFAULT_ENTRY),
  ]
}

fn package_entry_candidates(package_dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
  let manifest_path = package_dir.join(PACKAGE_MANIFEST);
  let manifest = match fs::read_to_string(&manifest_path) {
    Ok(content) => {
      serde_json::from_str::<PackageManifest>(&content).map_err(|source| ResolveError::Manifest {
        path: manifest_path.clone(),
        source,
      })?
    }
    Err(_) => PackageManifest::default(),
  };

  let mut candidates = Vec::new();
  if let Some(target) = manifest.exports.as_ref().and_then(export_target) {
    candidates.push(package_dir.join(target.trim_start_matches("./")));
  }
  if let Some(main) = manifest.main.as_deref() {
    let main = main.trim_start_matches("./");
    candidates.extend(subpath_candidates(package_dir, main));
  }
  candidates.push(package_dir.join(DEFAULT_ENTRY));
  Ok(candidates)
}

/// Pick the root export target from a `package.json` `exports` value.
fn export_target(exports: &Value) -> Option<&str> {
  match exports {
    Value::String(target) => Some(target.as_str()),
    Value::Array(targets) => targets.iter().find_map(export_target),
    Value::Object(map) => {
      if let Some(root) = map.get(".") {
        return export_target(root);
      }
      if map.keys().any(|key| key.starts_with('.')) {
        return None;
      }
      EXPORT_CONDITIONS
        .iter()
        .find_map(|condition| map.get(*condition).and_then(export_target))
    }
    _ => None,
  }
}
