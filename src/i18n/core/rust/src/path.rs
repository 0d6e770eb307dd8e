/* src/i18n/core/rust/src/path.rs */

// localePath / switchLocalePath / getRouteBaseName against the immutable route table.
// Every lookup has a fallback value; failures only warn.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::localize::{RouteId, RouteTable};
use crate::pattern::strip_trailing_slash;
use crate::registry::{Registry, Strategy};
use crate::resolve::ActiveLocaleContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  /// Base route name (a generated name like `about___fr` is accepted too)
  Name(String),
  /// Unlocalized path, e.g. `/about` or `/users/42`
  Path(String),
}

/// Descriptor accepted by `locale_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
  pub target: Target,
  pub params: BTreeMap<String, String>,
  pub query: Vec<(String, String)>,
  pub hash: Option<String>,
}

impl RouteTarget {
  pub fn name(name: &str) -> Self {
    Self::from_target(Target::Name(name.to_string()))
  }

  pub fn path(path: &str) -> Self {
    Self::from_target(Target::Path(path.to_string()))
  }

  fn from_target(target: Target) -> Self {
    Self { target, params: BTreeMap::new(), query: Vec::new(), hash: None }
  }

  pub fn param(mut self, key: &str, value: &str) -> Self {
    self.params.insert(key.to_string(), value.to_string());
    self
  }

  pub fn query(mut self, key: &str, value: &str) -> Self {
    self.query.push((key.to_string(), value.to_string()));
    self
  }

  pub fn hash(mut self, hash: &str) -> Self {
    self.hash = Some(hash.trim_start_matches('#').to_string());
    self
  }

  fn decorate(&self, path: String) -> String {
    let mut out = path;
    if !self.query.is_empty() {
      let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
      out.push('?');
      out.push_str(&encoded);
    }
    if let Some(ref hash) = self.hash
      && !hash.is_empty()
    {
      out.push('#');
      out.push_str(hash);
    }
    out
  }
}

/// Strings starting with `/` are paths, anything else a route name.
impl From<&str> for RouteTarget {
  fn from(value: &str) -> Self {
    if value.starts_with('/') { Self::path(value) } else { Self::name(value) }
  }
}

pub struct PathResolver<'a> {
  registry: &'a Registry,
  table: &'a RouteTable,
}

impl<'a> PathResolver<'a> {
  pub fn new(registry: &'a Registry, table: &'a RouteTable) -> Self {
    Self { registry, table }
  }

  /// Localized path for `target` in `locale` (default: the active locale).
  /// Unresolvable targets come back unchanged.
  pub fn locale_path(
    &self,
    ctx: &ActiveLocaleContext,
    target: impl Into<RouteTarget>,
    locale: Option<&str>,
  ) -> String {
    let target = target.into();
    let locale = locale.unwrap_or(&ctx.locale);
    if self.registry.strategy() == Strategy::NoPrefix && locale != ctx.locale {
      warn!(
        "i18n: passing locale \"{locale}\" to localePath is unsupported when using no_prefix; \
         returning the unprefixed path"
      );
    }

    let resolved = match target.target {
      Target::Name(ref name) => self.by_name(name, locale, &target.params),
      Target::Path(ref path) => self.by_path(path, locale, &target.params),
    };
    match resolved {
      Some(path) => target.decorate(path),
      None => match target.target {
        Target::Name(ref name) => {
          warn!("i18n: no route named \"{name}\" for locale \"{locale}\"");
          name.clone()
        }
        Target::Path(ref path) => {
          warn!("i18n: no route matches \"{path}\" for locale \"{locale}\"");
          target.decorate(path.clone())
        }
      },
    }
  }

  fn by_name(&self, name: &str, locale: &str, params: &BTreeMap<String, String>) -> Option<String> {
    let base = self.registry.base_name(name);
    let id = self.table.lookup(base, locale)?;
    self.table.render(id, params)
  }

  fn by_path(&self, path: &str, locale: &str, params: &BTreeMap<String, String>) -> Option<String> {
    let path = strip_trailing_slash(path);
    let default = self.registry.default_locale();
    let m = self
      .table
      .match_unprefixed(path, &[locale, default])
      .or_else(|| self.table.match_path(path, None))?;
    let mut merged = m.params;
    merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
    self.translate(m.id, locale, &merged)
  }

  /// Same page as `id`, rendered for `locale`.
  fn translate(
    &self,
    id: RouteId,
    locale: &str,
    params: &BTreeMap<String, String>,
  ) -> Option<String> {
    let target = self.table.equivalent(id, locale)?;
    self.table.render(target, params)
  }

  /// Path of the current page in `locale`, keeping params and query.
  /// Absolute URL when the locale lives on its own domain.
  pub fn switch_locale_path(&self, ctx: &ActiveLocaleContext, locale: &str) -> Option<String> {
    let Some(id) = ctx.route else {
      debug!("i18n: switchLocalePath without a matched route");
      return None;
    };
    let Some(path) = self.translate(id, locale, &ctx.params) else {
      warn!("i18n: no \"{locale}\" equivalent for \"{}\"", ctx.path);
      return None;
    };
    let path = match ctx.query.as_deref() {
      Some(q) if !q.is_empty() => format!("{path}?{q}"),
      _ => path,
    };
    if self.registry.different_domains()
      && let Some(domain) = self.registry.locale(locale).and_then(|l| l.domain.as_deref())
    {
      return Some(self.registry.domain_url(domain, &self.registry.public_path(&path)));
    }
    Some(path)
  }

  /// `index___fr` -> `index`; plain names pass through.
  pub fn get_route_base_name<'n>(&self, name: &'n str) -> &'n str {
    self.registry.base_name(name)
  }

  /// Base name of the context's route, via its nearest named ancestor.
  pub fn route_base_name(&self, ctx: &ActiveLocaleContext) -> Option<&'a str> {
    let named = self.table.nearest_named(ctx.route?)?;
    self.table.route(named).base_name.as_deref()
  }
}
