/* src/i18n/core/rust/src/extract.rs */

// Page tree -> base routes. Resolves per-locale path overrides from inline page
// directives and the explicit `pages` map (explicit wins for the same route+locale).

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::warn;

use crate::config::{I18nOptions, PageConfig, PathOverride};
use crate::errors::ConfigError;
use crate::pattern::{PathPattern, join_paths, normalize_markers};
use crate::registry::{Registry, Strategy};

/// Raw page node supplied by the page-discovery collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct PageNode {
  #[serde(default)]
  pub name: Option<String>,
  pub path: String,
  #[serde(default)]
  pub component: Option<String>,
  #[serde(default)]
  pub children: Vec<PageNode>,
  /// Inline page directive, honored only when `parse_pages` is on.
  #[serde(default)]
  pub i18n: Option<PageI18n>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageI18n {
  Toggle(bool),
  Options(InlineOptions),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InlineOptions {
  #[serde(default)]
  pub locales: Option<Vec<String>>,
  #[serde(default)]
  pub paths: BTreeMap<String, PathOverride>,
}

impl PageNode {
  pub fn new(name: &str, path: &str) -> Self {
    Self { name: Some(name.to_string()), ..Self::nameless(path) }
  }

  pub fn nameless(path: &str) -> Self {
    Self { name: None, path: path.to_string(), component: None, children: vec![], i18n: None }
  }

  pub fn with_children(mut self, children: Vec<PageNode>) -> Self {
    self.children = children;
    self
  }

  pub fn with_i18n(mut self, i18n: PageI18n) -> Self {
    self.i18n = Some(i18n);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleOverride {
  /// Custom template for the route's own path segment.
  Path(PathPattern),
  Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRoute {
  pub name: Option<String>,
  /// Own path: absolute for roots, relative for children.
  pub pattern: PathPattern,
  /// Absolute, unlocalized template.
  pub full_path: String,
  pub component: Option<String>,
  pub children: Vec<BaseRoute>,
  pub overrides: BTreeMap<String, LocaleOverride>,
  /// Locales this page is restricted to; None means every locale.
  pub locales: Option<Vec<String>>,
  pub localized: bool,
}

impl BaseRoute {
  pub fn override_for(&self, locale: &str) -> Option<&LocaleOverride> {
    self.overrides.get(locale)
  }

  pub fn allows(&self, locale: &str) -> bool {
    let restricted = self.locales.as_ref().is_some_and(|ls| !ls.iter().any(|l| l == locale));
    !restricted && self.override_for(locale) != Some(&LocaleOverride::Disabled)
  }
}

struct Extractor<'a> {
  options: &'a I18nOptions,
  registry: &'a Registry,
  names: HashSet<String>,
}

pub fn extract(
  pages: &[PageNode],
  options: &I18nOptions,
  registry: &Registry,
) -> Result<Vec<BaseRoute>, ConfigError> {
  let mut ex = Extractor { options, registry, names: HashSet::new() };
  pages.iter().map(|p| ex.node(p, None, false)).collect()
}

impl Extractor<'_> {
  fn node(
    &mut self,
    page: &PageNode,
    parent_full: Option<&str>,
    parent_localized: bool,
  ) -> Result<BaseRoute, ConfigError> {
    let raw = normalize_markers(&page.path);
    let pattern = PathPattern::parse(&raw)?;
    let full_path = match parent_full {
      Some(parent) => join_paths(parent, &pattern.relative_template()),
      None => pattern.template(),
    };
    // Validates the joined template as a whole (duplicate params across levels)
    PathPattern::parse(&full_path)?;

    if let Some(ref name) = page.name
      && !self.names.insert(name.clone())
    {
      return Err(ConfigError::DuplicateRouteName(name.clone()));
    }

    let mut route = BaseRoute {
      name: page.name.clone(),
      pattern,
      full_path,
      component: page.component.clone(),
      children: Vec::new(),
      overrides: BTreeMap::new(),
      locales: None,
      localized: true,
    };

    let options = self.options;
    if options.parse_pages {
      match &page.i18n {
        Some(PageI18n::Toggle(false)) => route.localized = false,
        Some(PageI18n::Options(inline)) => {
          if let Some(ref locales) = inline.locales {
            route.locales = Some(self.known_locales(locales, &route.full_path));
          }
          self.apply_paths(&mut route, &inline.paths)?;
        }
        Some(PageI18n::Toggle(true)) | None => {}
      }
    }

    let pages = &options.pages;
    let explicit =
      route.name.as_ref().and_then(|n| pages.get(n)).or_else(|| pages.get(&route.full_path));
    match explicit {
      Some(PageConfig::Toggle(false)) => route.localized = false,
      Some(PageConfig::Paths(paths)) => self.apply_paths(&mut route, paths)?,
      Some(PageConfig::Toggle(true)) | None => {}
    }

    // A nested page cannot leave its parent's locale prefix; keep only its own segment
    // untranslated.
    if !route.localized && parent_localized && self.registry.strategy() != Strategy::NoPrefix {
      warn!(
        "i18n: route \"{}\" opts out of localization under a localized parent; \
         it follows the parent's locale prefix with an untranslated path",
        route.full_path
      );
      route.localized = true;
      route.overrides.clear();
      route.locales = None;
    }

    let full = route.full_path.clone();
    let localized = route.localized;
    route.children = page
      .children
      .iter()
      .map(|c| self.node(c, Some(&full), localized))
      .collect::<Result<_, _>>()?;
    Ok(route)
  }

  fn apply_paths(
    &self,
    route: &mut BaseRoute,
    paths: &BTreeMap<String, PathOverride>,
  ) -> Result<(), ConfigError> {
    for (locale, value) in paths {
      if !self.registry.contains(locale) {
        warn!("i18n: route \"{}\" overrides unknown locale \"{locale}\", ignored", route.full_path);
        continue;
      }
      match value {
        PathOverride::Path(custom) => {
          let pattern = PathPattern::parse(&normalize_markers(custom))?;
          route.overrides.insert(locale.clone(), LocaleOverride::Path(pattern));
        }
        PathOverride::Toggle(false) => {
          route.overrides.insert(locale.clone(), LocaleOverride::Disabled);
        }
        PathOverride::Toggle(true) => {
          route.overrides.remove(locale);
        }
      }
    }
    Ok(())
  }

  fn known_locales(&self, locales: &[String], route: &str) -> Vec<String> {
    locales
      .iter()
      .filter(|l| {
        let known = self.registry.contains(l);
        if !known {
          warn!("i18n: route \"{route}\" lists unknown locale \"{l}\", ignored");
        }
        known
      })
      .cloned()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn setup(opts: &I18nOptions, pages: &[PageNode]) -> Result<Vec<BaseRoute>, ConfigError> {
    let registry = Registry::validate(opts).unwrap();
    extract(pages, opts, &registry)
  }

  fn inline(paths: &[(&str, PathOverride)]) -> PageI18n {
    PageI18n::Options(InlineOptions {
      locales: None,
      paths: paths.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
    })
  }

  #[test]
  fn builds_full_paths_for_children() {
    let pages = vec![
      PageNode::nameless("/users").with_children(vec![PageNode::new("users-id", ":id")]),
    ];
    let routes = setup(&I18nOptions::new(&["en", "fr"]), &pages).unwrap();
    assert_eq!(routes[0].full_path, "/users");
    assert_eq!(routes[0].children[0].full_path, "/users/:id");
    assert_eq!(routes[0].children[0].pattern.relative_template(), ":id");
  }

  #[test]
  fn normalizes_bracket_markers() {
    let pages = [PageNode::new("post", "/post/[slug]")];
    let routes = setup(&I18nOptions::new(&["en"]), &pages).unwrap();
    assert_eq!(routes[0].full_path, "/post/:slug");
  }

  #[test]
  fn duplicate_names_rejected() {
    let pages = vec![PageNode::new("about", "/about"), PageNode::new("about", "/about-2")];
    assert_eq!(
      setup(&I18nOptions::new(&["en"]), &pages).unwrap_err(),
      ConfigError::DuplicateRouteName("about".into())
    );
  }

  #[test]
  fn explicit_pages_override_inline() {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.pages.insert(
      "about".into(),
      PageConfig::Paths([("fr".to_string(), PathOverride::Path("/a-propos".into()))].into()),
    );
    let page = PageNode::new("about", "/about").with_i18n(inline(&[
      ("fr", PathOverride::Path("/sur".into())),
      ("en", PathOverride::Path("/about-us".into())),
    ]));
    let routes = setup(&opts, &[page]).unwrap();
    let fr = routes[0].override_for("fr");
    assert_eq!(fr, Some(&LocaleOverride::Path(PathPattern::parse("/a-propos").unwrap())));
    let en = routes[0].override_for("en");
    assert_eq!(en, Some(&LocaleOverride::Path(PathPattern::parse("/about-us").unwrap())));
  }

  #[test]
  fn inline_ignored_without_parse_pages() {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.parse_pages = false;
    let page =
      PageNode::new("about", "/about").with_i18n(inline(&[("fr", PathOverride::Toggle(false))]));
    let routes = setup(&opts, &[page]).unwrap();
    assert!(routes[0].overrides.is_empty());
    assert!(routes[0].allows("fr"));
  }

  #[test]
  fn disabled_locale_not_allowed() {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.parse_pages = false;
    opts.pages.insert(
      "about".into(),
      PageConfig::Paths([("fr".to_string(), PathOverride::Toggle(false))].into()),
    );
    let routes = setup(&opts, &[PageNode::new("about", "/about")]).unwrap();
    assert!(routes[0].allows("en"));
    assert!(!routes[0].allows("fr"));
  }

  #[test]
  fn page_level_false_unlocalizes() {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.pages.insert("legacy".into(), PageConfig::Toggle(false));
    let routes = setup(&opts, &[PageNode::new("legacy", "/legacy")]).unwrap();
    assert!(!routes[0].localized);
  }

  #[test]
  fn pages_keyed_by_path_for_nameless_routes() {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.pages.insert(
      "/users".into(),
      PageConfig::Paths([("fr".to_string(), PathOverride::Path("/utilisateurs".into()))].into()),
    );
    let routes = setup(&opts, &[PageNode::nameless("/users")]).unwrap();
    assert!(matches!(routes[0].override_for("fr"), Some(LocaleOverride::Path(_))));
  }

  #[test]
  fn inline_locale_restriction() {
    let page = PageNode::new("promo", "/promo").with_i18n(PageI18n::Options(InlineOptions {
      locales: Some(vec!["fr".into(), "xx".into()]),
      paths: BTreeMap::new(),
    }));
    let routes = setup(&I18nOptions::new(&["en", "fr"]), &[page]).unwrap();
    assert_eq!(routes[0].locales, Some(vec!["fr".to_string()]));
    assert!(!routes[0].allows("en"));
    assert!(routes[0].allows("fr"));
  }

  #[test]
  fn deserializes_page_tree_json() {
    let pages: Vec<PageNode> = serde_json::from_value(serde_json::json!([
      { "name": "index", "path": "/" },
      { "path": "/users", "children": [{ "name": "users-id", "path": ":id" }] },
      { "name": "about", "path": "/about", "i18n": { "paths": { "fr": "/a-propos" } } },
      { "name": "legacy", "path": "/legacy", "i18n": false },
    ]))
    .unwrap();
    let routes = setup(&I18nOptions::new(&["en", "fr"]), &pages).unwrap();
    assert_eq!(routes.len(), 4);
    assert!(routes[2].override_for("fr").is_some());
    assert!(!routes[3].localized);
  }
}
