/* src/i18n/core/rust/src/seo.rs */

use serde::Serialize;

use crate::localize::{RouteId, RouteTable};
use crate::registry::{Registry, Strategy};
use crate::resolve::ActiveLocaleContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum HeadTag {
  Link {
    rel: String,
    href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hreflang: Option<String>,
  },
  Meta {
    property: String,
    content: String,
  },
}

fn escape_attr(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '"' => out.push_str("&quot;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      _ => out.push(c),
    }
  }
  out
}

impl HeadTag {
  fn link(rel: &str, href: String, hreflang: Option<&str>) -> Self {
    Self::Link { rel: rel.to_string(), href, hreflang: hreflang.map(String::from) }
  }

  fn meta(property: &str, content: String) -> Self {
    Self::Meta { property: property.to_string(), content }
  }

  pub fn render(&self) -> String {
    match self {
      Self::Link { rel, href, hreflang: Some(lang) } => format!(
        r#"<link rel="{}" href="{}" hreflang="{}">"#,
        escape_attr(rel),
        escape_attr(href),
        escape_attr(lang)
      ),
      Self::Link { rel, href, hreflang: None } => {
        format!(r#"<link rel="{}" href="{}">"#, escape_attr(rel), escape_attr(href))
      }
      Self::Meta { property, content } => format!(
        r#"<meta property="{}" content="{}">"#,
        escape_attr(property),
        escape_attr(content)
      ),
    }
  }
}

/// Head metadata for one rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoHead {
  pub html_lang: String,
  pub tags: Vec<HeadTag>,
}

impl SeoHead {
  pub fn render(&self) -> String {
    self.tags.iter().map(HeadTag::render).collect()
  }
}

pub struct SeoMetaBuilder<'a> {
  registry: &'a Registry,
  table: &'a RouteTable,
}

impl<'a> SeoMetaBuilder<'a> {
  pub fn new(registry: &'a Registry, table: &'a RouteTable) -> Self {
    Self { registry, table }
  }

  pub fn build(&self, ctx: &ActiveLocaleContext) -> SeoHead {
    let current = self.registry.locale(&ctx.locale);
    let html_lang = current.map_or_else(|| ctx.locale.clone(), |l| l.tag().to_string());
    let mut tags = Vec::new();
    if !self.registry.seo() {
      return SeoHead { html_lang, tags };
    }

    tags.push(HeadTag::meta("og:locale", html_lang.replace('-', "_")));
    for other in self.registry.locales().iter().filter(|l| l.code != ctx.locale) {
      tags.push(HeadTag::meta("og:locale:alternate", other.tag().replace('-', "_")));
    }

    if let Some(id) = ctx.route {
      self.alternates(id, ctx, &mut tags);
    }
    if let Some(href) = self.canonical(ctx) {
      tags.push(HeadTag::link("canonical", href, None));
    }
    SeoHead { html_lang, tags }
  }

  /// hreflang links for every locale with an iso code, plus x-default.
  fn alternates(&self, id: RouteId, ctx: &ActiveLocaleContext, tags: &mut Vec<HeadTag>) {
    for locale in self.registry.locales() {
      let Some(ref iso) = locale.iso else { continue };
      if let Some(href) = self.href(id, &locale.code, ctx) {
        tags.push(HeadTag::link("alternate", href, Some(iso)));
      }
    }
    if let Some(href) = self.href(id, self.registry.default_locale(), ctx) {
      tags.push(HeadTag::link("alternate", href, Some("x-default")));
    }
  }

  fn href(&self, id: RouteId, locale: &str, ctx: &ActiveLocaleContext) -> Option<String> {
    let target = self.table.canonical_equivalent(id, locale)?;
    let path = self.table.render(target, &ctx.params)?;
    Some(self.registry.absolute_url(locale, &path))
  }

  fn canonical(&self, ctx: &ActiveLocaleContext) -> Option<String> {
    if self.registry.different_domains() {
      return None;
    }
    let id = ctx.route?;
    let current = || self.registry.absolute_url(&ctx.locale, &ctx.path);
    match self.registry.strategy() {
      Strategy::PrefixAndDefault => self.href(id, &ctx.locale, ctx).or_else(|| Some(current())),
      _ => Some(current()),
    }
  }
}
