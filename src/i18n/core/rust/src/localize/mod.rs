/* src/i18n/core/rust/src/localize/mod.rs */

// Base routes -> one physical route per (base route, locale) under the active strategy.
// Generation is pure: identical input yields an identical table.

mod table;


use tracing::debug;

pub use table::{LocalizedRoute, RouteId, RouteMatch, RouteTable};

use crate::extract::{BaseRoute, LocaleOverride};
use crate::pattern::{PathPattern, apply_override};
use crate::registry::{Registry, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
  /// `about`
  Plain,
  /// `about___fr`
  Suffixed,
  /// `about___en___default`
  DefaultAlias,
}

#[derive(Debug, Clone, Copy)]
struct Variant {
  prefixed: bool,
  naming: Naming,
}

/// Physical variants generated for one locale of a localized base route.
fn variants(registry: &Registry, code: &str) -> Vec<Variant> {
  let prefixed = Variant { prefixed: true, naming: Naming::Suffixed };
  if registry.different_domains() {
    // Domain identifies the locale; paths stay unprefixed
    return vec![Variant { prefixed: false, naming: Naming::Suffixed }];
  }
  let is_default = registry.is_default(code);
  match registry.strategy() {
    Strategy::Prefix => vec![prefixed],
    Strategy::PrefixExceptDefault if is_default => {
      vec![Variant { prefixed: false, naming: Naming::Plain }]
    }
    Strategy::PrefixExceptDefault => vec![prefixed],
    Strategy::PrefixAndDefault if is_default => {
      vec![prefixed, Variant { prefixed: false, naming: Naming::DefaultAlias }]
    }
    Strategy::PrefixAndDefault => vec![prefixed],
    // One shared route per base route, generated by `Builder::shared`
    Strategy::NoPrefix => vec![],
  }
}

struct Builder<'a> {
  registry: &'a Registry,
  routes: Vec<LocalizedRoute>,
}

/// Generate the route table.
pub fn localize(bases: &[BaseRoute], registry: &Registry) -> RouteTable {
  let mut builder = Builder { registry, routes: Vec::new() };
  for (i, base) in bases.iter().enumerate() {
    let key = i.to_string();
    if !base.localized || registry.strategy() == Strategy::NoPrefix {
      builder.shared(base, &key, None);
      continue;
    }
    for locale in registry.locales() {
      let code = locale.code.as_str();
      if !base.allows(code) {
        debug!("i18n: route \"{}\" disabled for locale \"{code}\"", base.full_path);
        continue;
      }
      for variant in variants(registry, code) {
        builder.localized(base, &key, code, variant, None);
      }
    }
  }
  debug!(
    routes = builder.routes.len(),
    strategy = registry.strategy().as_str(),
    "i18n: route table generated"
  );
  RouteTable::new(registry.strategy(), registry.default_locale(), builder.routes)
}

impl Builder<'_> {
  fn push(&mut self, route: LocalizedRoute) -> RouteId {
    let id = RouteId(self.routes.len());
    if let Some(parent) = route.parent {
      self.routes[parent.0].children.push(id);
    }
    self.routes.push(route);
    id
  }

  fn own_path(own: &PathPattern, parent: Option<RouteId>) -> String {
    if parent.is_some() { own.relative_template() } else { own.template() }
  }

  /// Position of a child in the base tree: `0`, `0.1`, `0.1.0`.
  fn child_key(key: &str, index: usize) -> String {
    format!("{key}.{index}")
  }

  fn localized(
    &mut self,
    base: &BaseRoute,
    key: &str,
    code: &str,
    variant: Variant,
    parent: Option<RouteId>,
  ) {
    let own = match base.override_for(code) {
      Some(LocaleOverride::Path(custom)) => apply_override(&base.pattern, custom),
      Some(LocaleOverride::Disabled) | None => base.pattern.clone(),
    };
    let (pattern, unprefixed_pattern) = match parent {
      Some(pid) => {
        let p = &self.routes[pid.0];
        (p.pattern.join(&own), p.unprefixed_pattern.join(&own))
      }
      None if variant.prefixed => (own.with_prefix(code), own.clone()),
      None => (own.clone(), own.clone()),
    };
    let name = base.name.as_ref().map(|n| match variant.naming {
      Naming::Plain => n.clone(),
      Naming::Suffixed => self.registry.localized_name(n, code),
      Naming::DefaultAlias => self.registry.default_alias_name(n),
    });

    let id = self.push(LocalizedRoute {
      name,
      base_name: base.name.clone(),
      base_key: key.to_string(),
      locale: Some(code.to_string()),
      path: Self::own_path(&own, parent),
      full_path: pattern.template(),
      unprefixed_path: unprefixed_pattern.template(),
      prefixed: variant.prefixed,
      default_alias: variant.naming == Naming::DefaultAlias,
      component: base.component.clone(),
      parent,
      children: Vec::new(),
      pattern,
      unprefixed_pattern,
    });

    for (i, child) in base.children.iter().enumerate() {
      if child.allows(code) {
        self.localized(child, &Self::child_key(key, i), code, variant, Some(id));
      }
    }
  }

  fn shared(&mut self, base: &BaseRoute, key: &str, parent: Option<RouteId>) {
    let pattern = match parent {
      Some(pid) => self.routes[pid.0].pattern.join(&base.pattern),
      None => base.pattern.clone(),
    };
    let id = self.push(LocalizedRoute {
      name: base.name.clone(),
      base_name: base.name.clone(),
      base_key: key.to_string(),
      locale: None,
      path: Self::own_path(&base.pattern, parent),
      full_path: pattern.template(),
      unprefixed_path: pattern.template(),
      prefixed: false,
      default_alias: false,
      component: base.component.clone(),
      parent,
      children: Vec::new(),
      unprefixed_pattern: pattern.clone(),
      pattern,
    });
    for (i, child) in base.children.iter().enumerate() {
      self.shared(child, &Self::child_key(key, i), Some(id));
    }
  }
}
