/* src/i18n/core/rust/src/lib.rs */

pub mod config;
pub mod errors;
pub mod extract;
pub mod localize;
pub mod messages;
pub mod path;
pub mod pattern;
pub mod registry;
pub mod resolve;
pub mod seo;

use std::sync::Arc;

use tracing::info;

// Re-exports for ergonomic use
pub use config::{
  DetectBrowserLanguage, DetectOptions, I18nOptions, LocaleOption, LocaleSpec, PageConfig,
  PathOverride, RedirectOn, RouterMode, RouterOptions,
};
pub use errors::{ConfigError, I18nError};
pub use extract::{BaseRoute, PageI18n, PageNode, extract};
pub use localize::{LocalizedRoute, RouteId, RouteMatch, RouteTable, localize};
pub use messages::{BoxFuture, LazyFileMessages, MessageSource, StaticMessages, translate};
pub use path::{PathResolver, RouteTarget, Target};
pub use pattern::PathPattern;
pub use registry::{ConfigWarning, Locale, Registry, Strategy};
pub use resolve::{
  ActiveLocaleContext, LocaleResolver, LocaleSource, Outcome, RequestInfo, Resolution,
};
pub use seo::{HeadTag, SeoHead, SeoMetaBuilder};

/// Validated registry plus the generated route table. Built once at startup,
/// then shared read-only across requests.
#[derive(Debug, Clone)]
pub struct I18nRouter {
  registry: Arc<Registry>,
  table: Arc<RouteTable>,
}

impl I18nRouter {
  pub fn setup(options: &I18nOptions, pages: &[PageNode]) -> Result<Self, ConfigError> {
    let registry = Registry::validate(options)?;
    let bases = extract(pages, options, &registry)?;
    let table = localize(&bases, &registry);
    info!(
      locales = registry.locales().len(),
      routes = table.len(),
      strategy = registry.strategy().as_str(),
      "i18n: router ready"
    );
    Ok(Self { registry: Arc::new(registry), table: Arc::new(table) })
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn table(&self) -> &RouteTable {
    &self.table
  }

  pub fn resolver(&self) -> LocaleResolver<'_> {
    LocaleResolver::new(&self.registry, &self.table)
  }

  pub fn paths(&self) -> PathResolver<'_> {
    PathResolver::new(&self.registry, &self.table)
  }

  pub fn seo(&self) -> SeoMetaBuilder<'_> {
    SeoMetaBuilder::new(&self.registry, &self.table)
  }

  pub fn resolve(&self, req: &RequestInfo<'_>) -> Resolution {
    self.resolver().resolve(req)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn setup_wires_components() {
    let pages = [PageNode::new("index", "/"), PageNode::new("about", "/about")];
    let router = I18nRouter::setup(&I18nOptions::new(&["en", "fr"]), &pages).unwrap();
    assert_eq!(router.table().len(), 4);

    let res = router.resolve(&RequestInfo::new("/fr/about"));
    assert_eq!(res.context.locale, "fr");
    let paths = router.paths();
    assert_eq!(paths.switch_locale_path(&res.context, "en").as_deref(), Some("/about"));
    assert_eq!(paths.locale_path(&res.context, "index", None), "/fr");
    assert_eq!(router.seo().build(&res.context).html_lang, "fr");
  }

  fn iso_locale(code: &str, iso: &str) -> LocaleOption {
    LocaleOption::Full(LocaleSpec {
      code: code.into(),
      iso: Some(iso.into()),
      name: None,
      domain: None,
      file: None,
      fallback: None,
    })
  }

  #[test]
  fn nameless_child_keeps_its_own_segment() {
    let mut opts = I18nOptions::new(&[]);
    opts.locales = vec![iso_locale("en", "en-US"), iso_locale("fr", "fr-FR")];
    opts.default_locale = Some("en".into());
    let pages =
      [PageNode::new("users", "/users").with_children(vec![PageNode::nameless(":id")])];
    let router = I18nRouter::setup(&opts, &pages).unwrap();
    let paths = router.paths();

    let res = router.resolve(&RequestInfo::new("/users/7"));
    assert_eq!(res.context.route_name.as_deref(), Some("users"));
    let fr = paths.switch_locale_path(&res.context, "fr").unwrap();
    assert_eq!(fr, "/fr/users/7");
    let back = router.resolve(&RequestInfo::new(&fr));
    assert_eq!(paths.switch_locale_path(&back.context, "en").as_deref(), Some("/users/7"));

    let res = router.resolve(&RequestInfo::new("/users/7").cookie("i18n_redirected=fr"));
    assert_eq!(res.outcome, Outcome::Redirect("/fr/users/7".into()));

    let head = router.seo().build(&back.context);
    let alternate = |href: &str, lang: &str| HeadTag::Link {
      rel: "alternate".into(),
      href: href.into(),
      hreflang: Some(lang.into()),
    };
    assert!(head.tags.contains(&alternate("/users/7", "en-US")));
    assert!(head.tags.contains(&alternate("/fr/users/7", "fr-FR")));
  }

  #[test]
  fn setup_reports_config_errors() {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.strategy = "bogus".into();
    let err = I18nRouter::setup(&opts, &[]).unwrap_err();
    assert_eq!(err.to_string(), "Invalid \"strategy\" option \"bogus\"");
  }
}
