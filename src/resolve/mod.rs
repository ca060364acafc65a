//! Turning script references into bytes.
//!
//! Remote URLs and module specifiers go through different capabilities but end up in the same
//! shape: the script content plus the file name the emitted asset should be based on.

mod module;
mod remote;

use std::path::Path;

pub use module::{ModuleResolver, NodeModulesResolver, split_specifier};
pub use remote::{FetchedScript, HttpFetcher, RemoteFetcher, file_name_from_url};

use crate::error::LoadError;
use crate::models::ScriptSource;

/// Script content obtained for a reference, before it is inlined or emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedScript {
  /// File name the emitted asset is derived from.
  pub file_name: String,
  /// Raw script bytes.
  pub content: Vec<u8>,
}

/// Capability pair used to load both kinds of script reference.
pub struct ScriptLoader<'a> {
  /// Network access for remote references.
  pub fetcher: &'a dyn RemoteFetcher,
  /// Module lookup for `npm:` references.
  pub resolver: &'a dyn ModuleResolver,
  /// Promote progress messages to `info`.
  pub verbose: bool,
}

impl ScriptLoader<'_> {
  /// Fetch or resolve `source`. `from_dir` is the directory of the referencing document.
  pub async fn load(&self, source: &ScriptSource, from_dir: &Path) -> Result<LoadedScript, LoadError> {
    match source {
      ScriptSource::Remote(url) => {
        progress(self.verbose, format_args!("Downloading {url}"));
        let fetched = self.fetcher.fetch(url).await?;
        Ok(LoadedScript {
          file_name: file_name_from_url(&fetched.final_url),
          content: fetched.body,
        })
      }
      ScriptSource::Module(specifier) => {
        progress(self.verbose, format_args!("Resolving {specifier}"));
        let path = self.resolver.resolve(specifier, from_dir)?;
        let content = tokio::fs::read(&path)
          .await
          .map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
          })?;
        let file_name = path
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
          .unwrap_or_else(|| specifier.rsplit('/').next().unwrap_or(specifier).to_string());
        Ok(LoadedScript { file_name, content })
      }
    }
  }
}

/// Log a per-reference progress message at `info` when verbose, `debug` otherwise.
pub(crate) fn progress(verbose: bool, message: std::fmt::Arguments<'_>) {
  if verbose {
    tracing::info!("{message}");
  } else {
    tracing::debug!("{message}");
  }
}

#[cfg(test)]
pub(crate) mod testing {
  //! In-memory capabilities shared by the rewriter tests.

  use std::collections::HashMap;
  use std::path::{Path, PathBuf};

  use async_trait::async_trait;

  use super::{FetchedScript, ModuleResolver, RemoteFetcher};
  use crate::error::{FetchError, ResolveError};

  /// Serves canned bodies keyed by URL; unknown URLs answer 404.
  #[derive(Default)]
  pub struct StaticFetcher {
    responses: HashMap<String, (String, Vec<u8>)>,
  }

  impl StaticFetcher {
    pub fn with(mut self, url: &str, final_url: &str, body: &str) -> Self {
      self
        .responses
        .insert(url.to_string(), (final_url.to_string(), body.as_bytes().to_vec()));
      self
    }
  }

  #[async_trait]
  impl RemoteFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedScript, FetchError> {
      match self.responses.get(url) {
        Some((final_url, body)) => Ok(FetchedScript {
          final_url: final_url.clone(),
          body: body.clone(),
        }),
        None => Err(FetchError::Status {
          url: url.to_string(),
          status: 404,
        }),
      }
    }
  }

  /// Maps specifiers to fixed paths regardless of the importing directory.
  #[derive(Default)]
  pub struct StaticResolver {
    modules: HashMap<String, PathBuf>,
  }

  impl StaticResolver {
    pub fn with(mut self, specifier: &str, path: impl Into<PathBuf>) -> Self {
      self.modules.insert(specifier.to_string(), path.into());
      self
    }
  }

  impl ModuleResolver for StaticResolver {
    fn resolve(&self, specifier: &str, _from_dir: &Path) -> Result<PathBuf, ResolveError> {
      self
        .modules
        .get(specifier)
        .cloned()
        .ok_or_else(|| ResolveError::NotFound {
          specifier: specifier.to_string(),
        })
    }
  }
}
