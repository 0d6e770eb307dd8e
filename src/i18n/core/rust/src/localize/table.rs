/* src/i18n/core/rust/src/localize/table.rs */

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::pattern::PathPattern;
use crate::registry::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteId(pub(crate) usize);

impl RouteId {
  pub fn index(self) -> usize {
    self.0
  }
}

/// One physical route generated from a base route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedRoute {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_name: Option<String>,
  /// Position of the base route in the page tree; shared by all its localized copies.
  #[serde(skip)]
  pub(crate) base_key: String,
  /// None when the route serves every locale (`no_prefix` or unlocalized pages).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub locale: Option<String>,
  /// Own path: absolute for roots, relative for children.
  pub path: String,
  pub full_path: String,
  pub unprefixed_path: String,
  pub prefixed: bool,
  /// Unprefixed default-locale copy under `prefix_and_default`.
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub default_alias: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub component: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<RouteId>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<RouteId>,
  #[serde(skip)]
  pub(crate) pattern: PathPattern,
  #[serde(skip)]
  pub(crate) unprefixed_pattern: PathPattern,
}

impl LocalizedRoute {
  pub fn is_shared(&self) -> bool {
    self.locale.is_none()
  }

  pub fn serves(&self, locale: &str) -> bool {
    self.locale.as_deref().is_none_or(|l| l == locale)
  }

  pub fn pattern(&self) -> &PathPattern {
    &self.pattern
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
  pub id: RouteId,
  pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TableIndex {
  /// base key -> locale -> route used for path lookups
  by_key: HashMap<String, HashMap<String, RouteId>>,
  /// base key -> locale -> prefixed route (SEO canonical)
  canonical: HashMap<String, HashMap<String, RouteId>>,
  /// base key -> locale-agnostic route
  shared: HashMap<String, RouteId>,
  /// base name -> base key
  base_keys: HashMap<String, String>,
  by_name: HashMap<String, RouteId>,
  match_order: Vec<RouteId>,
}

/// Immutable result of route localization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTable {
  strategy: Strategy,
  default_locale: String,
  routes: Vec<LocalizedRoute>,
  #[serde(skip)]
  index: TableIndex,
}

fn depth(routes: &[LocalizedRoute], mut id: RouteId) -> usize {
  let mut d = 0;
  while let Some(parent) = routes[id.0].parent {
    d += 1;
    id = parent;
  }
  d
}

impl RouteTable {
  pub(crate) fn new(strategy: Strategy, default_locale: &str, routes: Vec<LocalizedRoute>) -> Self {
    let mut index = TableIndex::default();
    for (i, route) in routes.iter().enumerate() {
      let id = RouteId(i);
      if let Some(ref name) = route.name {
        index.by_name.entry(name.clone()).or_insert(id);
      }
      if let Some(ref base) = route.base_name {
        index.base_keys.entry(base.clone()).or_insert_with(|| route.base_key.clone());
      }
      let key = &route.base_key;
      match route.locale {
        None => {
          index.shared.entry(key.clone()).or_insert(id);
        }
        Some(ref locale) => {
          let keyed = index.by_key.entry(key.clone()).or_default();
          if route.default_alias {
            keyed.insert(locale.clone(), id);
          } else {
            keyed.entry(locale.clone()).or_insert(id);
            index.canonical.entry(key.clone()).or_default().insert(locale.clone(), id);
          }
        }
      }
    }

    // Most specific first: more literals, fewer params, prefixed, deeper, table order
    let mut order: Vec<RouteId> = (0..routes.len()).map(RouteId).collect();
    order.sort_by_key(|&id| {
      let r = &routes[id.0];
      (
        Reverse(r.pattern.static_count()),
        r.pattern.param_count(),
        Reverse(r.prefixed),
        Reverse(depth(&routes, id)),
        id,
      )
    });
    index.match_order = order;

    Self { strategy, default_locale: default_locale.to_string(), routes, index }
  }

  pub fn strategy(&self) -> Strategy {
    self.strategy
  }

  pub fn default_locale(&self) -> &str {
    &self.default_locale
  }

  pub fn routes(&self) -> &[LocalizedRoute] {
    &self.routes
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }

  pub fn route(&self, id: RouteId) -> &LocalizedRoute {
    &self.routes[id.0]
  }

  pub fn get(&self, id: RouteId) -> Option<&LocalizedRoute> {
    self.routes.get(id.0)
  }

  pub fn by_name(&self, name: &str) -> Option<RouteId> {
    self.index.by_name.get(name).copied()
  }

  fn lookup_key(&self, key: &str, locale: &str) -> Option<RouteId> {
    self
      .index
      .by_key
      .get(key)
      .and_then(|m| m.get(locale))
      .or_else(|| self.index.shared.get(key))
      .copied()
  }

  fn canonical_key(&self, key: &str, locale: &str) -> Option<RouteId> {
    self
      .index
      .canonical
      .get(key)
      .and_then(|m| m.get(locale))
      .copied()
      .or_else(|| self.lookup_key(key, locale))
  }

  /// Route serving `base` in `locale`; locale-agnostic routes serve every locale.
  pub fn lookup(&self, base: &str, locale: &str) -> Option<RouteId> {
    self.lookup_key(self.index.base_keys.get(base)?, locale)
  }

  /// Like `lookup`, but prefers the prefixed copy when a base route has two.
  pub fn canonical(&self, base: &str, locale: &str) -> Option<RouteId> {
    self.canonical_key(self.index.base_keys.get(base)?, locale)
  }

  /// Copy of the same page as `id` serving `locale`. Works for nameless routes too.
  pub fn equivalent(&self, id: RouteId, locale: &str) -> Option<RouteId> {
    self.lookup_key(&self.get(id)?.base_key, locale)
  }

  /// Like `equivalent`, but prefers the prefixed copy.
  pub fn canonical_equivalent(&self, id: RouteId, locale: &str) -> Option<RouteId> {
    self.canonical_key(&self.get(id)?.base_key, locale)
  }

  pub fn render(&self, id: RouteId, params: &BTreeMap<String, String>) -> Option<String> {
    self.routes.get(id.0).and_then(|r| r.pattern.render(params))
  }

  /// Match a request path. With `locale`, routes bound to other locales are skipped.
  pub fn match_path(&self, path: &str, locale: Option<&str>) -> Option<RouteMatch> {
    self.index.match_order.iter().find_map(|&id| {
      let route = &self.routes[id.0];
      if locale.is_some_and(|l| !route.serves(l)) {
        return None;
      }
      route.pattern.matches(path).map(|params| RouteMatch { id, params })
    })
  }

  /// Match a path against the unprefixed templates, trying `prefer` locales in order
  /// and then locale-agnostic routes.
  pub fn match_unprefixed(&self, path: &str, prefer: &[&str]) -> Option<RouteMatch> {
    let try_with = |want: Option<&str>| {
      self.index.match_order.iter().find_map(|&id| {
        let route = &self.routes[id.0];
        if route.locale.as_deref() != want {
          return None;
        }
        route.unprefixed_pattern.matches(path).map(|params| RouteMatch { id, params })
      })
    };
    prefer.iter().find_map(|l| try_with(Some(*l))).or_else(|| try_with(None))
  }

  /// Nearest route carrying a name: the route itself, an ancestor, or a named
  /// default (empty-path) child of a nameless route.
  pub fn nearest_named(&self, id: RouteId) -> Option<RouteId> {
    let mut cursor = Some(id);
    while let Some(current) = cursor {
      let route = self.get(current)?;
      if route.base_name.is_some() {
        return Some(current);
      }
      cursor = route.parent;
    }
    self
      .route(id)
      .children
      .iter()
      .copied()
      .find(|&c| self.routes[c.0].base_name.is_some() && self.routes[c.0].path.is_empty())
  }
}
