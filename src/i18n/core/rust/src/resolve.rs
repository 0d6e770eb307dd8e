/* src/i18n/core/rust/src/resolve.rs */

// Per-request locale resolution. First match wins:
// domain (differentDomains) -> path prefix -> cookie -> Accept-Language -> default.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::RedirectOn;
use crate::localize::{RouteId, RouteMatch, RouteTable};
use crate::pattern::strip_trailing_slash;
use crate::registry::{Locale, Registry, Strategy};

/// Request signals the resolver reads. Borrowed from the incoming request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestInfo<'a> {
  /// Request path; a `?query` suffix is split off when `query` is unset.
  pub path: &'a str,
  pub query: Option<&'a str>,
  pub host: Option<&'a str>,
  pub cookie_header: Option<&'a str>,
  pub accept_language: Option<&'a str>,
}

impl<'a> RequestInfo<'a> {
  pub fn new(path: &'a str) -> Self {
    Self { path, ..Default::default() }
  }

  pub fn host(mut self, host: &'a str) -> Self {
    self.host = Some(host);
    self
  }

  pub fn cookie(mut self, header: &'a str) -> Self {
    self.cookie_header = Some(header);
    self
  }

  pub fn accept_language(mut self, header: &'a str) -> Self {
    self.accept_language = Some(header);
    self
  }
}

/// Request-scoped locale context, read by path lookups and SEO metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveLocaleContext {
  pub locale: String,
  /// Base name of the matched route (or its nearest named ancestor).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub route_name: Option<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub params: BTreeMap<String, String>,
  pub path: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub query: Option<String>,
  #[serde(skip)]
  pub route: Option<RouteId>,
}

impl ActiveLocaleContext {
  /// Context without a matched route.
  pub fn new(locale: &str, path: &str) -> Self {
    Self {
      locale: locale.to_string(),
      route_name: None,
      params: BTreeMap::new(),
      path: path.to_string(),
      query: None,
      route: None,
    }
  }

  pub fn matched(table: &RouteTable, locale: &str, m: RouteMatch, path: &str) -> Self {
    let route_name =
      table.nearest_named(m.id).and_then(|id| table.route(id).base_name.clone());
    Self {
      locale: locale.to_string(),
      route_name,
      params: m.params,
      path: path.to_string(),
      query: None,
      route: Some(m.id),
    }
  }

  fn with_query(mut self, query: Option<&str>) -> Self {
    self.query = query.filter(|q| !q.is_empty()).map(String::from);
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocaleSource {
  Domain,
  PathPrefix,
  /// Unprefixed route bound to the default locale
  Route,
  Cookie,
  Header,
  Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum Outcome {
  Render,
  /// Base-relative location; apply `Registry::public_path` before sending.
  Redirect(String),
  NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
  pub context: ActiveLocaleContext,
  pub source: LocaleSource,
  pub outcome: Outcome,
  /// Locale to persist in the detection cookie, when it changed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub set_cookie: Option<String>,
}

impl Resolution {
  fn new(context: ActiveLocaleContext, source: LocaleSource, outcome: Outcome) -> Self {
    Self { context, source, outcome, set_cookie: None }
  }

  pub fn status(&self) -> u16 {
    match self.outcome {
      Outcome::Render => 200,
      Outcome::Redirect(_) => 302,
      Outcome::NotFound => 404,
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.outcome == Outcome::NotFound
  }
}

pub struct LocaleResolver<'a> {
  registry: &'a Registry,
  table: &'a RouteTable,
}

fn split_query<'a>(path: &'a str, query: Option<&'a str>) -> (&'a str, Option<&'a str>) {
  match (query, path.split_once('?')) {
    (Some(q), Some((p, _))) => (p, Some(q)),
    (Some(q), None) => (path, Some(q)),
    (None, Some((p, q))) => (p, Some(q)),
    (None, None) => (path, None),
  }
}

fn normalize_path(path: &str) -> String {
  let path = strip_trailing_slash(path);
  if path.starts_with('/') { path.to_string() } else { format!("/{path}") }
}

fn append_query(path: &str, query: Option<&str>) -> String {
  match query {
    Some(q) if !q.is_empty() => format!("{path}?{q}"),
    _ => path.to_string(),
  }
}

impl<'a> LocaleResolver<'a> {
  pub fn new(registry: &'a Registry, table: &'a RouteTable) -> Self {
    Self { registry, table }
  }

  pub fn resolve(&self, req: &RequestInfo<'_>) -> Resolution {
    let (raw_path, query) = split_query(req.path, req.query);
    let path = normalize_path(raw_path);
    let cookie = self.cookie_locale(req);

    let mut res = if self.registry.different_domains() {
      self.by_domain(req, &path)
    } else {
      self.by_path(req, &path, cookie)
    };
    res.context = res.context.with_query(query);
    if let Outcome::Redirect(ref location) = res.outcome {
      res.outcome = Outcome::Redirect(append_query(location, query));
    }
    res.set_cookie = self.cookie_update(&res, cookie);

    debug!(
      path = %path,
      locale = %res.context.locale,
      source = ?res.source,
      outcome = ?res.outcome,
      "i18n: request resolved"
    );
    res
  }

  fn by_domain(&self, req: &RequestInfo<'_>, path: &str) -> Resolution {
    let (locale, source) = match req.host.and_then(|h| self.registry.domain_locale(h)) {
      Some(l) => (l.code.as_str(), LocaleSource::Domain),
      None => (self.registry.default_locale(), LocaleSource::Default),
    };
    match self.table.match_path(path, Some(locale)) {
      Some(m) => Resolution::new(
        ActiveLocaleContext::matched(self.table, locale, m, path),
        source,
        Outcome::Render,
      ),
      None => {
        Resolution::new(ActiveLocaleContext::new(locale, path), source, Outcome::NotFound)
      }
    }
  }

  fn by_path(&self, req: &RequestInfo<'_>, path: &str, cookie: Option<&'a str>) -> Resolution {
    if let Some(m) = self.table.match_path(path, None) {
      let route = self.table.route(m.id);
      let bound = route.locale.clone();
      let prefixed = route.prefixed;
      return match bound {
        Some(locale) if prefixed => Resolution::new(
          ActiveLocaleContext::matched(self.table, &locale, m, path),
          LocaleSource::PathPrefix,
          Outcome::Render,
        ),
        Some(locale) => self.unprefixed_default(req, path, cookie, &locale, m),
        None => {
          let (locale, source) = self.detect(req, cookie);
          Resolution::new(
            ActiveLocaleContext::matched(self.table, locale, m, path),
            source,
            Outcome::Render,
          )
        }
      };
    }

    let (locale, source) = self.detect(req, cookie);
    if self.registry.strategy() != Strategy::NoPrefix {
      let default = self.registry.default_locale();
      if let Some(m) = self.table.match_unprefixed(path, &[locale, default]) {
        for target in [locale, default] {
          if let Some(location) = self.equivalent(m.id, &m.params, target)
            && location != path
          {
            let context = ActiveLocaleContext::new(target, path);
            let source = if target == locale { source } else { LocaleSource::Default };
            return Resolution::new(context, source, Outcome::Redirect(location));
          }
        }
      }
    }
    Resolution::new(ActiveLocaleContext::new(locale, path), source, Outcome::NotFound)
  }

  /// Unprefixed route owned by the default locale: render it, or redirect when
  /// detection picked another locale.
  fn unprefixed_default(
    &self,
    req: &RequestInfo<'_>,
    path: &str,
    cookie: Option<&'a str>,
    locale: &str,
    m: RouteMatch,
  ) -> Resolution {
    let (detected, source) = self.detect(req, cookie);
    if detected != locale
      && self.may_redirect(path)
      && let Some(location) = self.equivalent(m.id, &m.params, detected)
    {
      let context = ActiveLocaleContext::new(detected, path);
      return Resolution::new(context, source, Outcome::Redirect(location));
    }
    Resolution::new(
      ActiveLocaleContext::matched(self.table, locale, m, path),
      LocaleSource::Route,
      Outcome::Render,
    )
  }

  fn may_redirect(&self, path: &str) -> bool {
    match self.registry.detect().map(|d| d.redirect_on) {
      Some(RedirectOn::All) => true,
      Some(RedirectOn::Root) => path == "/",
      None => false,
    }
  }

  /// Path of the same page in `locale`, keeping dynamic params.
  fn equivalent(
    &self,
    id: RouteId,
    params: &BTreeMap<String, String>,
    locale: &str,
  ) -> Option<String> {
    let target = self.table.equivalent(id, locale)?;
    self.table.render(target, params)
  }

  fn detect(&self, req: &RequestInfo<'_>, cookie: Option<&'a str>) -> (&'a str, LocaleSource) {
    if let Some(code) = cookie {
      return (code, LocaleSource::Cookie);
    }
    if self.registry.detect().is_some()
      && let Some(header) = req.accept_language
      && let Some(locale) = parse_accept_language(header, self.registry)
    {
      return (locale.code.as_str(), LocaleSource::Header);
    }
    (self.registry.default_locale(), LocaleSource::Default)
  }

  fn cookie_locale(&self, req: &RequestInfo<'_>) -> Option<&'a str> {
    let detect = self.registry.detect().filter(|d| d.use_cookie)?;
    let value = parse_cookie(req.cookie_header?, &detect.cookie_key)?;
    match self.registry.locale(value) {
      Some(locale) => Some(locale.code.as_str()),
      None => {
        debug!("i18n: ignoring cookie locale \"{value}\" (not configured)");
        None
      }
    }
  }

  fn cookie_update(&self, res: &Resolution, cookie: Option<&str>) -> Option<String> {
    self.registry.detect().filter(|d| d.use_cookie)?;
    if res.is_not_found() || cookie == Some(res.context.locale.as_str()) {
      return None;
    }
    Some(res.context.locale.clone())
  }
}

fn parse_cookie<'h>(header: &'h str, name: &str) -> Option<&'h str> {
  header.split(';').find_map(|pair| {
    let (k, v) = pair.trim().split_once('=')?;
    (k.trim() == name).then(|| v.trim().trim_matches('"'))
  })
}

fn match_tag<'r>(tag: &str, registry: &'r Registry) -> Option<&'r Locale> {
  let locales = registry.locales();
  let iso_match = |l: &&Locale| l.iso.as_deref().is_some_and(|i| i.eq_ignore_ascii_case(tag));
  if let Some(l) = locales.iter().find(iso_match) {
    return Some(l);
  }
  if let Some(l) = locales.iter().find(|l| l.code.eq_ignore_ascii_case(tag)) {
    return Some(l);
  }
  // Language-only match: zh-CN -> zh, fr -> fr-FR
  let lang = tag.split('-').next().unwrap_or(tag);
  locales.iter().find(|l| {
    let code_lang = l.code.split('-').next().unwrap_or(&l.code);
    let iso_lang = l.iso.as_deref().and_then(|i| i.split('-').next());
    code_lang.eq_ignore_ascii_case(lang) || iso_lang.is_some_and(|i| i.eq_ignore_ascii_case(lang))
  })
}

/// Highest-q language tag from the header that maps to a configured locale.
fn parse_accept_language<'r>(header: &str, registry: &'r Registry) -> Option<&'r Locale> {
  let mut entries: Vec<(&str, f64)> = Vec::new();
  for part in header.split(',') {
    let part = part.trim();
    if part.is_empty() {
      continue;
    }
    let mut segments = part.split(';');
    let lang = segments.next().unwrap_or("").trim();
    let mut q = 1.0_f64;
    for s in segments {
      if let Some(val) = s.trim().strip_prefix("q=")
        && let Ok(v) = val.parse::<f64>()
      {
        q = v;
      }
    }
    if !lang.is_empty() && lang != "*" && q > 0.0 {
      entries.push((lang, q));
    }
  }

  // Stable: equal weights keep header order
  entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
  entries.iter().find_map(|(lang, _)| match_tag(lang, registry))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{I18nOptions, LocaleOption, LocaleSpec, PageConfig, PathOverride};
  use crate::extract::{PageNode, extract};
  use crate::localize::localize;

  fn build(opts: &I18nOptions, pages: &[PageNode]) -> (Registry, RouteTable) {
    let registry = Registry::validate(opts).unwrap();
    let bases = extract(pages, opts, &registry).unwrap();
    let table = localize(&bases, &registry);
    (registry, table)
  }

  fn pages() -> Vec<PageNode> {
    vec![
      PageNode::new("index", "/"),
      PageNode::new("about", "/about"),
      PageNode::nameless("/users").with_children(vec![PageNode::new("users-id", ":id")]),
    ]
  }

  fn opts(strategy: &str) -> I18nOptions {
    let mut o = I18nOptions::new(&["en", "fr"]);
    o.strategy = strategy.into();
    o
  }

  fn resolve(opts: &I18nOptions, req: RequestInfo<'_>) -> Resolution {
    let (registry, table) = build(opts, &pages());
    LocaleResolver::new(&registry, &table).resolve(&req)
  }

  #[test]
  fn prefixed_path_wins_over_cookie() {
    let res = resolve(
      &opts("prefix_except_default"),
      RequestInfo::new("/fr/about").cookie("i18n_redirected=en"),
    );
    assert_eq!(res.context.locale, "fr");
    assert_eq!(res.source, LocaleSource::PathPrefix);
    assert_eq!(res.outcome, Outcome::Render);
    assert_eq!(res.context.route_name.as_deref(), Some("about"));
    assert_eq!(res.set_cookie.as_deref(), Some("fr"));
  }

  #[test]
  fn unprefixed_default_renders_without_signals() {
    let res = resolve(&opts("prefix_except_default"), RequestInfo::new("/about"));
    assert_eq!(res.context.locale, "en");
    assert_eq!(res.outcome, Outcome::Render);
    assert_eq!(res.status(), 200);
  }

  #[test]
  fn cookie_redirects_to_prefixed_equivalent() {
    let res = resolve(
      &opts("prefix_except_default"),
      RequestInfo::new("/users/7").cookie("other=1; i18n_redirected=fr"),
    );
    assert_eq!(res.source, LocaleSource::Cookie);
    assert_eq!(res.outcome, Outcome::Redirect("/fr/users/7".into()));
    assert_eq!(res.status(), 302);
    assert_eq!(res.set_cookie, None);
  }

  #[test]
  fn invalid_cookie_falls_back_to_default() {
    let res = resolve(
      &opts("prefix_except_default"),
      RequestInfo::new("/about").cookie("i18n_redirected=invalid"),
    );
    assert_eq!(res.context.locale, "en");
    assert_eq!(res.outcome, Outcome::Render);
  }

  #[test]
  fn header_preference_redirects() {
    let res = resolve(
      &opts("prefix_except_default"),
      RequestInfo::new("/").accept_language("fr-CA,fr;q=0.9,en;q=0.5"),
    );
    assert_eq!(res.source, LocaleSource::Header);
    assert_eq!(res.outcome, Outcome::Redirect("/fr".into()));
  }

  #[test]
  fn header_ignored_when_detection_disabled() {
    let mut o = opts("prefix_except_default");
    o.detect_browser_language = crate::config::DetectBrowserLanguage::Toggle(false);
    let res = resolve(&o, RequestInfo::new("/").accept_language("fr"));
    assert_eq!(res.context.locale, "en");
    assert_eq!(res.outcome, Outcome::Render);
    assert_eq!(res.set_cookie, None);
  }

  #[test]
  fn redirect_on_root_only() {
    let mut o = opts("prefix_except_default");
    o.detect_browser_language =
      crate::config::DetectBrowserLanguage::Options(crate::config::DetectOptions {
        redirect_on: RedirectOn::Root,
        ..Default::default()
      });
    let res = resolve(&o, RequestInfo::new("/about").cookie("i18n_redirected=fr"));
    assert_eq!(res.outcome, Outcome::Render);
    assert_eq!(res.context.locale, "en");
    let res = resolve(&o, RequestInfo::new("/").cookie("i18n_redirected=fr"));
    assert_eq!(res.outcome, Outcome::Redirect("/fr".into()));
  }

  #[test]
  fn prefix_strategy_redirects_bare_paths() {
    let res = resolve(&opts("prefix"), RequestInfo::new("/about"));
    assert_eq!(res.outcome, Outcome::Redirect("/en/about".into()));
    let res = resolve(&opts("prefix"), RequestInfo::new("/?utm=1").cookie("i18n_redirected=fr"));
    assert_eq!(res.outcome, Outcome::Redirect("/fr?utm=1".into()));
  }

  #[test]
  fn prefix_and_default_serves_both_forms() {
    let o = opts("prefix_and_default");
    let bare = resolve(&o, RequestInfo::new("/about"));
    let prefixed = resolve(&o, RequestInfo::new("/en/about"));
    assert_eq!(bare.outcome, Outcome::Render);
    assert_eq!(prefixed.outcome, Outcome::Render);
    assert_eq!(bare.context.route_name, prefixed.context.route_name);
    assert_eq!(bare.context.locale, "en");
  }

  #[test]
  fn no_prefix_uses_cookie_and_404s_prefixed_paths() {
    let o = opts("no_prefix");
    let res = resolve(&o, RequestInfo::new("/about").cookie("i18n_redirected=fr"));
    assert_eq!(res.context.locale, "fr");
    assert_eq!(res.outcome, Outcome::Render);
    let res = resolve(&o, RequestInfo::new("/fr/about"));
    assert!(res.is_not_found());
  }

  #[test]
  fn unknown_path_is_not_found() {
    let res = resolve(&opts("prefix_except_default"), RequestInfo::new("/nope"));
    assert_eq!(res.status(), 404);
    assert_eq!(res.set_cookie, None);
  }

  #[test]
  fn disabled_locale_page_is_not_found() {
    let mut o = opts("prefix_except_default");
    o.pages.insert(
      "about".into(),
      PageConfig::Paths([("fr".to_string(), PathOverride::Toggle(false))].into()),
    );
    let (registry, table) = build(&o, &pages());
    let resolver = LocaleResolver::new(&registry, &table);
    assert!(resolver.resolve(&RequestInfo::new("/fr/about")).is_not_found());
    assert_eq!(resolver.resolve(&RequestInfo::new("/about")).outcome, Outcome::Render);
  }

  #[test]
  fn trailing_slash_and_query_normalized() {
    let res = resolve(&opts("prefix_except_default"), RequestInfo::new("/fr/about/?a=1"));
    assert_eq!(res.outcome, Outcome::Render);
    assert_eq!(res.context.path, "/fr/about");
    assert_eq!(res.context.query.as_deref(), Some("a=1"));
  }

  #[test]
  fn dynamic_params_captured() {
    let res = resolve(&opts("prefix"), RequestInfo::new("/fr/users/42"));
    assert_eq!(res.context.params.get("id").map(String::as_str), Some("42"));
    assert_eq!(res.context.route_name.as_deref(), Some("users-id"));
  }

  fn domain_opts() -> I18nOptions {
    let mut o = opts("prefix_except_default");
    o.different_domains = true;
    o.locales = ["en", "fr"]
      .iter()
      .map(|c| {
        LocaleOption::Full(LocaleSpec {
          code: (*c).into(),
          iso: None,
          name: None,
          domain: Some(format!("{c}.example.com")),
          file: None,
          fallback: None,
        })
      })
      .collect();
    o
  }

  #[test]
  fn domain_selects_locale() {
    let res = resolve(&domain_opts(), RequestInfo::new("/about").host("fr.example.com"));
    assert_eq!(res.context.locale, "fr");
    assert_eq!(res.source, LocaleSource::Domain);
    assert_eq!(res.outcome, Outcome::Render);
  }

  #[test]
  fn unknown_domain_uses_default_without_redirect() {
    let res = resolve(
      &domain_opts(),
      RequestInfo::new("/about").host("other.example.com").cookie("i18n_redirected=fr"),
    );
    assert_eq!(res.context.locale, "en");
    assert_eq!(res.source, LocaleSource::Default);
    assert_eq!(res.outcome, Outcome::Render);
  }

  #[test]
  fn parse_cookie_variants() {
    assert_eq!(parse_cookie("a=1; i18n_redirected=fr", "i18n_redirected"), Some("fr"));
    assert_eq!(parse_cookie("lang=fr", "i18n_redirected"), None);
  }

  #[test]
  fn accept_language_matching() {
    let mut o = I18nOptions::new(&["en"]);
    o.locales.push(LocaleOption::Full(LocaleSpec {
      code: "pt".into(),
      iso: Some("pt-BR".into()),
      name: None,
      domain: None,
      file: None,
      fallback: None,
    }));
    let registry = Registry::validate(&o).unwrap();
    let code = |h: &str| parse_accept_language(h, &registry).map(|l| l.code.clone());
    assert_eq!(code("pt-BR,en;q=0.1").as_deref(), Some("pt"));
    assert_eq!(code("en;q=0.2,pt;q=0.9").as_deref(), Some("pt"));
    assert_eq!(code("en-GB").as_deref(), Some("en"));
    assert_eq!(code("de,*;q=0.1"), None);
    assert_eq!(code(""), None);
  }
}
