//! Error types raised at the collaborator seams of the rewriter.
//!
//! None of these abort a document: the rewriter logs them and keeps the original tag text.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to download a remote script.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The request could not be sent or the body could not be read.
  #[error("request to {url} failed: {source}")]
  Transport {
    /// URL that was requested.
    url: String,
    /// Underlying client error.
    #[source]
    source: reqwest::Error,
  },
  /// The server answered with a non-success status.
  #[error("{url} responded with {status}")]
  Status {
    /// URL that was requested.
    url: String,
    /// Status code returned by the server.
    status: u16,
  },
}

/// Failure to map a module specifier onto a local file.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The specifier is not a valid package name.
  #[error("invalid module specifier `{0}`")]
  InvalidSpecifier(String),
  /// No `node_modules` directory on the search path contains the package.
  #[error("cannot find module `{specifier}`")]
  NotFound {
    /// Specifier that was looked up.
    specifier: String,
  },
  /// The package exists but none of its entry candidates is a file.
  #[error("module `{specifier}` has no entry file in {}", .package_dir.display())]
  MissingEntry {
    /// Specifier that was looked up.
    specifier: String,
    /// Package directory that was inspected.
    package_dir: PathBuf,
  },
  /// `package.json` could not be parsed.
  #[error("failed to parse {}: {source}", .path.display())]
  Manifest {
    /// Path to the offending `package.json`.
    path: PathBuf,
    /// Parse error.
    #[source]
    source: serde_json::Error,
  },
}

/// Failure to persist a resolved script.
#[derive(Debug, Error)]
pub enum AssetError {
  /// The naming template produced an empty path.
  #[error("asset naming template `{0}` produced an empty path")]
  EmptyPath(String),
  /// Filesystem error while writing the asset.
  #[error("failed to write {}: {source}", .path.display())]
  Io {
    /// Destination path.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
}

/// Failure to load an explicitly requested configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration.
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
}

/// Failure to obtain the bytes behind a script reference.
#[derive(Debug, Error)]
pub enum LoadError {
  /// Remote download failed.
  #[error(transparent)]
  Fetch(#[from] FetchError),
  /// Module specifier could not be resolved.
  #[error(transparent)]
  Resolve(#[from] ResolveError),
  /// The resolved module file could not be read.
  #[error("failed to read {}: {source}", .path.display())]
  Read {
    /// Resolved module path.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
}
