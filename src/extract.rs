//! Locating `<script>` tags that point at remote URLs or `npm:` module specifiers.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::{ScriptReference, ScriptSource, TagTerminator};

/// Attribute runs skip over `{...}` expressions so a `>` inside an arrow function does not end
/// the tag.
fn script_tag_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(
      r#"<script\b(?:[^>{]|\{[^}]*\})*?(?P<attr>\s+src=(?:"(?P<dq>(?:npm:|https?://)[^"]*)"|'(?P<sq>(?:npm:|https?://)[^']*)'))(?:[^>{]|\{[^}]*\})*?(?:(?P<selfclose>/>)|>\s*(?P<close></script>))"#,
    )
    .expect("invalid script tag regex")
  })
}

/// Collect every remote or module script reference in `text`, in source order.
///
/// Only the `src` attribute is inspected. Tags pointing at relative or absolute local paths, and
/// tags carrying an inline body, are left out.
pub fn extract_script_references(text: &str) -> Vec<ScriptReference> {
  script_tag_pattern()
    .captures_iter(text)
    .filter_map(|caps| reference_from_captures(&caps))
    .collect()
}

/// Returns `true` when `text` contains at least one tag the rewriter would touch.
pub fn has_script_references(text: &str) -> bool {
  script_tag_pattern()
    .captures_iter(text)
    .any(|caps| reference_from_captures(&caps).is_some())
}

fn reference_from_captures(caps: &Captures<'_>) -> Option<ScriptReference> {
  let whole = caps.get(0)?;
  let value = caps.name("dq").or_else(|| caps.name("sq"))?;
  let attr = caps.name("attr")?;
  let source = ScriptSource::classify(value.as_str())?;
  let terminator = if caps.name("selfclose").is_some() {
    TagTerminator::SelfClosing
  } else {
    TagTerminator::ClosingTag
  };

  let base = whole.start();
  Some(ScriptReference {
    matched: whole.as_str().to_string(),
    span: whole.range(),
    reference: value.as_str().to_string(),
    reference_span: (value.start() - base)..(value.end() - base),
    attribute_span: (attr.start() - base)..(attr.end() - base),
    terminator,
    source,
  })
}
