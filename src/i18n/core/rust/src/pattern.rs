/* src/i18n/core/rust/src/pattern.rs */

// Path templates: `/users/:id`, `:page?`, `:rest*`, `:rest+`.
// Templates are matched segment-wise; static literals compare exactly.

use std::collections::BTreeMap;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
  Required,
  Optional,
  ZeroOrMore,
  OneOrMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Static(String),
  Param { name: String, kind: ParamKind },
}

impl Segment {
  fn template(&self) -> String {
    match self {
      Self::Static(s) => s.clone(),
      Self::Param { name, kind } => {
        let modifier = match kind {
          ParamKind::Required => "",
          ParamKind::Optional => "?",
          ParamKind::ZeroOrMore => "*",
          ParamKind::OneOrMore => "+",
        };
        format!(":{name}{modifier}")
      }
    }
  }
}

/// Parsed path template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPattern {
  segments: Vec<Segment>,
}

fn invalid(path: &str, reason: &str) -> ConfigError {
  ConfigError::InvalidPathTemplate { path: path.to_string(), reason: reason.to_string() }
}

fn parse_segment(path: &str, raw: &str) -> Result<Segment, ConfigError> {
  let Some(body) = raw.strip_prefix(':') else {
    return Ok(Segment::Static(raw.to_string()));
  };
  // `:id(\\d+)` style constraints are accepted and dropped
  let body = body.split_once('(').map_or(body, |(head, _)| head);
  let (name, kind) = match body.chars().last() {
    Some('?') => (&body[..body.len() - 1], ParamKind::Optional),
    Some('*') => (&body[..body.len() - 1], ParamKind::ZeroOrMore),
    Some('+') => (&body[..body.len() - 1], ParamKind::OneOrMore),
    _ => (body, ParamKind::Required),
  };
  if name.is_empty() {
    return Err(invalid(path, "dynamic segment without a name"));
  }
  if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    return Err(invalid(path, &format!("invalid parameter name \"{name}\"")));
  }
  Ok(Segment::Param { name: name.to_string(), kind })
}

impl PathPattern {
  pub fn parse(path: &str) -> Result<Self, ConfigError> {
    let mut segments = Vec::new();
    let mut seen = Vec::new();
    for raw in path.split('/').filter(|s| !s.is_empty()) {
      let seg = parse_segment(path, raw)?;
      if let Segment::Param { ref name, .. } = seg {
        if seen.contains(name) {
          return Err(invalid(path, &format!("parameter \"{name}\" appears twice")));
        }
        seen.push(name.clone());
      }
      segments.push(seg);
    }
    Ok(Self { segments })
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  pub fn params(&self) -> Vec<&str> {
    self
      .segments
      .iter()
      .filter_map(|s| match s {
        Segment::Param { name, .. } => Some(name.as_str()),
        Segment::Static(_) => None,
      })
      .collect()
  }

  pub fn static_count(&self) -> usize {
    self.segments.iter().filter(|s| matches!(s, Segment::Static(_))).count()
  }

  pub fn param_count(&self) -> usize {
    self.segments.len() - self.static_count()
  }

  /// Absolute template string, `/` for the empty pattern.
  pub fn template(&self) -> String {
    if self.segments.is_empty() {
      return "/".to_string();
    }
    self.segments.iter().map(|s| format!("/{}", s.template())).collect()
  }

  /// Template without the leading slash, used for relative child paths.
  pub fn relative_template(&self) -> String {
    self.segments.iter().map(Segment::template).collect::<Vec<_>>().join("/")
  }

  /// Fill dynamic segments. Returns None when a required parameter is missing.
  pub fn render(&self, params: &BTreeMap<String, String>) -> Option<String> {
    let mut out = String::new();
    for seg in &self.segments {
      match seg {
        Segment::Static(s) => {
          out.push('/');
          out.push_str(s);
        }
        Segment::Param { name, kind } => {
          let value = params.get(name).map(String::as_str).filter(|v| !v.is_empty());
          match (value, kind) {
            (Some(v), _) => {
              out.push('/');
              out.push_str(v.trim_matches('/'));
            }
            (None, ParamKind::Optional | ParamKind::ZeroOrMore) => {}
            (None, ParamKind::Required | ParamKind::OneOrMore) => return None,
          }
        }
      }
    }
    if out.is_empty() {
      out.push('/');
    }
    Some(out)
  }

  /// Parent segments followed by the child's.
  pub fn join(&self, child: &PathPattern) -> PathPattern {
    let mut segments = self.segments.clone();
    segments.extend(child.segments.iter().cloned());
    PathPattern { segments }
  }

  /// Locale code as a leading static segment.
  pub fn with_prefix(&self, code: &str) -> PathPattern {
    let mut segments = vec![Segment::Static(code.to_string())];
    segments.extend(self.segments.iter().cloned());
    PathPattern { segments }
  }

  /// Match a concrete path, returning the captured parameters.
  pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut params = BTreeMap::new();
    if match_from(&self.segments, &parts, &mut params) { Some(params) } else { None }
  }
}

fn match_from(segs: &[Segment], parts: &[&str], out: &mut BTreeMap<String, String>) -> bool {
  let Some((seg, rest)) = segs.split_first() else {
    return parts.is_empty();
  };
  match seg {
    Segment::Static(s) => {
      parts.first().is_some_and(|p| *p == s.as_str()) && match_from(rest, &parts[1..], out)
    }
    Segment::Param { name, kind } => {
      let (min, max) = match kind {
        ParamKind::Required => (1, 1),
        ParamKind::Optional => (0, 1),
        ParamKind::ZeroOrMore => (0, parts.len()),
        ParamKind::OneOrMore => (1, parts.len()),
      };
      let max = max.min(parts.len());
      if min > max {
        return false;
      }
      // Greedy: longest capture first
      for n in (min..=max).rev() {
        if n > 0 {
          out.insert(name.clone(), parts[..n].join("/"));
        }
        if match_from(rest, &parts[n..], out) {
          return true;
        }
        out.remove(name);
      }
      false
    }
  }
}

/// Convert bracket markers from file-based discovery into colon syntax:
/// `[id]` -> `:id`, `[[id]]` -> `:id?`, `[...slug]` -> `:slug*`.
pub fn normalize_markers(path: &str) -> String {
  path
    .split('/')
    .map(|seg| {
      if let Some(inner) = seg.strip_prefix("[[").and_then(|s| s.strip_suffix("]]")) {
        return format!(":{inner}?");
      }
      if let Some(inner) = seg.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
        return format!(":{inner}*");
      }
      if let Some(inner) = seg.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return format!(":{inner}");
      }
      seg.to_string()
    })
    .collect::<Vec<_>>()
    .join("/")
}

/// Join a child path (relative) onto an absolute parent template.
pub fn join_paths(parent: &str, child: &str) -> String {
  let child = child.trim_matches('/');
  if child.is_empty() {
    return parent.to_string();
  }
  if parent == "/" {
    format!("/{child}")
  } else {
    format!("{}/{child}", parent.trim_end_matches('/'))
  }
}

/// Strip exactly one trailing slash, never from the root path.
pub fn strip_trailing_slash(path: &str) -> &str {
  if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path }
}

/// Keep the dynamic segments of `base` while taking the literal text of `custom`.
///
/// When `custom` names every parameter of `base` it is used as written. Otherwise its
/// static segments replace the base's static segments positionally; if the counts
/// differ, base parameters missing from `custom` are appended in base order.
pub fn apply_override(base: &PathPattern, custom: &PathPattern) -> PathPattern {
  let custom_params = custom.params();
  let base_params = base.params();
  if base_params.iter().all(|p| custom_params.contains(p)) {
    return custom.clone();
  }

  let statics: Vec<&Segment> =
    custom.segments.iter().filter(|s| matches!(s, Segment::Static(_))).collect();
  if statics.len() == base.static_count() && custom_params.is_empty() {
    let mut literal = statics.into_iter();
    let segments = base
      .segments
      .iter()
      .map(|seg| match seg {
        Segment::Static(_) => literal.next().cloned().unwrap_or_else(|| seg.clone()),
        Segment::Param { .. } => seg.clone(),
      })
      .collect();
    return PathPattern { segments };
  }

  let mut segments = custom.segments.clone();
  for seg in &base.segments {
    if let Segment::Param { name, .. } = seg
      && !custom_params.contains(&name.as_str())
    {
      segments.push(seg.clone());
    }
  }
  PathPattern { segments }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pat(s: &str) -> PathPattern {
    PathPattern::parse(s).unwrap()
  }

  fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn parse_kinds() {
    let p = pat("/blog/:slug/:page?/:rest*");
    assert_eq!(p.static_count(), 1);
    assert_eq!(p.params(), vec!["slug", "page", "rest"]);
    assert_eq!(p.template(), "/blog/:slug/:page?/:rest*");
  }

  #[test]
  fn parse_drops_regex_constraint() {
    assert_eq!(pat("/user/:id(\\d+)").template(), "/user/:id");
  }

  #[test]
  fn parse_rejects_empty_name() {
    assert!(matches!(PathPattern::parse("/a/:"), Err(ConfigError::InvalidPathTemplate { .. })));
  }

  #[test]
  fn parse_rejects_duplicate_param() {
    assert!(PathPattern::parse("/:id/x/:id").is_err());
  }

  #[test]
  fn root_template() {
    assert_eq!(pat("/").template(), "/");
    assert_eq!(pat("/").render(&BTreeMap::new()).as_deref(), Some("/"));
  }

  #[test]
  fn render_fills_params() {
    let p = pat("/users/:id/posts");
    assert_eq!(p.render(&params(&[("id", "42")])).as_deref(), Some("/users/42/posts"));
    assert_eq!(p.render(&BTreeMap::new()), None);
  }

  #[test]
  fn render_skips_missing_optional() {
    assert_eq!(pat("/blog/:page?").render(&BTreeMap::new()).as_deref(), Some("/blog"));
  }

  #[test]
  fn match_static_and_dynamic() {
    assert_eq!(pat("/about").matches("/about"), Some(BTreeMap::new()));
    assert_eq!(pat("/about").matches("/about/more"), None);
    assert_eq!(pat("/users/:id").matches("/users/7"), Some(params(&[("id", "7")])));
  }

  #[test]
  fn match_optional_and_repeat() {
    assert_eq!(pat("/blog/:page?").matches("/blog"), Some(BTreeMap::new()));
    assert_eq!(pat("/blog/:page?").matches("/blog/2"), Some(params(&[("page", "2")])));
    assert_eq!(pat("/docs/:path*").matches("/docs/a/b/c"), Some(params(&[("path", "a/b/c")])));
    assert_eq!(pat("/docs/:path+").matches("/docs"), None);
  }

  #[test]
  fn normalize_bracket_markers() {
    assert_eq!(normalize_markers("/users/[id]"), "/users/:id");
    assert_eq!(normalize_markers("/blog/[[page]]"), "/blog/:page?");
    assert_eq!(normalize_markers("/docs/[...slug]"), "/docs/:slug*");
  }

  #[test]
  fn join_paths_relative() {
    assert_eq!(join_paths("/", "about"), "/about");
    assert_eq!(join_paths("/users", ":id"), "/users/:id");
    assert_eq!(join_paths("/users", ""), "/users");
  }

  #[test]
  fn prefix_and_join_patterns() {
    assert_eq!(pat("/").with_prefix("fr").template(), "/fr");
    assert_eq!(pat("/about").with_prefix("fr").template(), "/fr/about");
    assert_eq!(pat("/users").join(&pat(":id")).template(), "/users/:id");
  }

  #[test]
  fn trailing_slash_strips_once() {
    assert_eq!(strip_trailing_slash("/about/"), "/about");
    assert_eq!(strip_trailing_slash("/about//"), "/about/");
    assert_eq!(strip_trailing_slash("/"), "/");
  }

  #[test]
  fn override_with_all_params_used_verbatim() {
    let out = apply_override(&pat("/posts/:id"), &pat("/articles/:id/lire"));
    assert_eq!(out.template(), "/articles/:id/lire");
  }

  #[test]
  fn override_literals_replace_positionally() {
    let out = apply_override(&pat("/posts/:id/comments"), &pat("/articles/commentaires"));
    assert_eq!(out.template(), "/articles/:id/commentaires");
  }

  #[test]
  fn override_appends_missing_params() {
    let out = apply_override(&pat("/posts/:id"), &pat("/blog/articles"));
    assert_eq!(out.template(), "/blog/articles/:id");
  }
}
