//! Rewriting script references in a single document.

use std::path::Path;

use futures::future::join_all;
use serde_json::Value;

use crate::config::BuildConfig;
use crate::extract::extract_script_references;
use crate::models::{ResolvedAsset, RewriteOptions, ScriptReference, TagTerminator};
use crate::resolve::{
  HttpFetcher, ModuleResolver, NodeModulesResolver, RemoteFetcher, ScriptLoader, progress,
};

/// What happened to one script reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOutcome {
  /// Content was emitted as an asset and the tag now points at it.
  Linked(ResolvedAsset),
  /// Content was embedded in the tag.
  Inlined,
  /// The tag was left as written.
  Unchanged,
}

/// Rewritten document text together with the outcome of each reference, in match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRewrite {
  /// Full document text after substitution.
  pub contents: String,
  /// One entry per matched reference.
  pub outcomes: Vec<ReferenceOutcome>,
}

impl DocumentRewrite {
  /// Assets emitted while rewriting this document.
  pub fn assets(&self) -> impl Iterator<Item = &ResolvedAsset> {
    self.outcomes.iter().filter_map(|outcome| match outcome {
      ReferenceOutcome::Linked(asset) => Some(asset),
      _ => None,
    })
  }

  /// Number of references left untouched.
  pub fn unchanged(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|outcome| matches!(outcome, ReferenceOutcome::Unchanged))
      .count()
  }
}

/// Resolves every remote and `npm:` script tag of a document and splices the results back in.
pub struct ScriptRewriter {
  options: RewriteOptions,
  config: BuildConfig,
  fetcher: Box<dyn RemoteFetcher>,
  resolver: Box<dyn ModuleResolver>,
}

impl ScriptRewriter {
  /// Create a rewriter using HTTP for remote scripts and `node_modules` lookup for modules.
  pub fn new(options: RewriteOptions, config: BuildConfig) -> Self {
    let resolver = NodeModulesResolver::with_roots(config.module_roots.iter().cloned());
    Self {
      options,
      config,
      fetcher: Box::new(HttpFetcher::new()),
      resolver: Box::new(resolver),
    }
  }

  /// Replace the network capability.
  pub fn with_fetcher(mut self, fetcher: impl RemoteFetcher + 'static) -> Self {
    self.fetcher = Box::new(fetcher);
    self
  }

  /// Replace the module resolution capability.
  pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
    self.resolver = Box::new(resolver);
    self
  }

  /// Options the rewriter was created with.
  pub fn options(&self) -> &RewriteOptions {
    &self.options
  }

  /// Host configuration the rewriter was created with.
  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Rewrite `text`, the contents of the document at `path`.
  ///
  /// All references are resolved concurrently on the calling task. Replacements are applied in
  /// match order and a reference that fails to resolve keeps its original text.
  pub async fn rewrite_document(&self, text: &str, path: &Path) -> DocumentRewrite {
    let references = extract_script_references(text);
    if references.is_empty() {
      return DocumentRewrite {
        contents: text.to_string(),
        outcomes: Vec::new(),
      };
    }

    let from_dir = path
      .parent()
      .filter(|parent| !parent.as_os_str().is_empty())
      .unwrap_or(Path::new("."));

    let (replacements, outcomes): (Vec<String>, Vec<ReferenceOutcome>) = join_all(
      references
        .iter()
        .map(|reference| self.rewrite_reference(reference, from_dir)),
    )
    .await
    .into_iter()
    .unzip();

    DocumentRewrite {
      contents: splice_replacements(text, &references, &replacements),
      outcomes,
    }
  }

  async fn rewrite_reference(
    &self,
    reference: &ScriptReference,
    from_dir: &Path,
  ) -> (String, ReferenceOutcome) {
    let unchanged = || (reference.matched.clone(), ReferenceOutcome::Unchanged);
    let verbose = self.options.verbose;

    let layout = self.config.asset_layout();
    if !self.options.inline && layout.is_none() {
      tracing::debug!(
        reference = %reference.reference,
        "no output directory configured, leaving script tag unchanged"
      );
      return unchanged();
    }

    let loader = ScriptLoader {
      fetcher: self.fetcher.as_ref(),
      resolver: self.resolver.as_ref(),
      verbose,
    };
    let loaded = match loader.load(&reference.source, from_dir).await {
      Ok(loaded) => loaded,
      Err(err) => {
        tracing::error!(
          reference = %reference.reference,
          kind = reference.source.kind(),
          "failed to load script: {err}"
        );
        return unchanged();
      }
    };

    if self.options.inline {
      return (inline_script(reference, &loaded.content), ReferenceOutcome::Inlined);
    }

    let Some(layout) = layout else {
      return unchanged();
    };
    let emitted = match layout.locate(&loaded.file_name, &loaded.content) {
      Ok(location) => {
        progress(
          verbose,
          format_args!("Writing to {}", location.output_path.display()),
        );
        layout.write(location, loaded.content).await
      }
      Err(err) => Err(err),
    };
    match emitted {
      Ok(asset) => (
        link_script(reference, &asset.public_path),
        ReferenceOutcome::Linked(asset),
      ),
      Err(err) => {
        tracing::error!(reference = %reference.reference, "failed to emit script: {err}");
        unchanged()
      }
    }
  }
}

/// Point the tag at `public_path` instead of the original reference.
pub fn link_script(reference: &ScriptReference, public_path: &str) -> String {
  let matched = &reference.matched;
  format!(
    "{}{}{}",
    &matched[..reference.reference_span.start],
    public_path,
    &matched[reference.reference_span.end..]
  )
}

/// Drop the `src` attribute and embed `content` as a JSON string expression in the element body.
///
/// A self-closing tag becomes an open/close pair: `<script src="..." />` turns into
/// `<script>{"..."}</script>`.
pub fn inline_script(reference: &ScriptReference, content: &[u8]) -> String {
  let matched = &reference.matched;
  let without_src = format!(
    "{}{}",
    &matched[..reference.attribute_span.start],
    &matched[reference.attribute_span.end..]
  );
  let terminator = reference.terminator.as_str();
  let open_tag = without_src
    .strip_suffix(terminator)
    .unwrap_or(&without_src)
    .trim_end();
  let open_tag = match reference.terminator {
    TagTerminator::SelfClosing => format!("{open_tag}>"),
    TagTerminator::ClosingTag => open_tag.to_string(),
  };

  let literal = Value::String(String::from_utf8_lossy(content).into_owned()).to_string();
  format!("{open_tag}{{{literal}}}</script>")
}

/// Replace each reference's span with its replacement in a single left-to-right pass.
///
/// `references` must be ordered and non-overlapping, as produced by
/// [`extract_script_references`].
pub fn splice_replacements(
  text: &str,
  references: &[ScriptReference],
  replacements: &[String],
) -> String {
  let mut output = String::with_capacity(text.len());
  let mut cursor = 0;
  for (reference, replacement) in references.iter().zip(replacements) {
    output.push_str(&text[cursor..reference.span.start]);
    output.push_str(replacement);
    cursor = reference.span.end;
  }
  output.push_str(&text[cursor..]);
  output
}
