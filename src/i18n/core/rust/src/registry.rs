/* src/i18n/core/rust/src/registry.rs */

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::config::{DetectOptions, I18nOptions, RouterMode};
use crate::errors::ConfigError;

/// Where locale codes appear in generated paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
  Prefix,
  PrefixExceptDefault,
  PrefixAndDefault,
  NoPrefix,
}

impl Strategy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Prefix => "prefix",
      Self::PrefixExceptDefault => "prefix_except_default",
      Self::PrefixAndDefault => "prefix_and_default",
      Self::NoPrefix => "no_prefix",
    }
  }
}

impl FromStr for Strategy {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "prefix" => Ok(Self::Prefix),
      "prefix_except_default" => Ok(Self::PrefixExceptDefault),
      "prefix_and_default" => Ok(Self::PrefixAndDefault),
      "no_prefix" => Ok(Self::NoPrefix),
      other => Err(ConfigError::InvalidStrategy(other.to_string())),
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locale {
  pub code: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub iso: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fallback: Option<String>,
}

impl Locale {
  /// Language tag used for `<html lang>` and hreflang: iso when present, else code.
  pub fn tag(&self) -> &str {
    self.iso.as_deref().unwrap_or(&self.code)
  }
}

/// Non-fatal setup diagnostics. Each is logged once when the registry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
  IncompatibleDifferentDomains,
  MissingIso(String),
}

impl fmt::Display for ConfigWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::IncompatibleDifferentDomains => f.write_str(
        "The `differentDomains` option and `no_prefix` strategy are not compatible. \
         Change strategy or disable `differentDomains` option.",
      ),
      Self::MissingIso(code) => {
        write!(f, "Locale \"{code}\" has no iso code; it is skipped in hreflang alternate links")
      }
    }
  }
}

/// Validated locale set plus the strategy-level settings every component reads.
#[derive(Debug, Clone)]
pub struct Registry {
  locales: Vec<Locale>,
  default_locale: String,
  strategy: Strategy,
  different_domains: bool,
  fallback_locale: Option<String>,
  seo: bool,
  base_url: Option<Url>,
  router_base: String,
  router_mode: RouterMode,
  separator: String,
  default_suffix: String,
  detect: Option<DetectOptions>,
  lazy: bool,
  lang_dir: Option<String>,
  warnings: Vec<ConfigWarning>,
}

fn normalize_base(base: &str) -> String {
  let trimmed = base.trim_matches('/');
  if trimmed.is_empty() { "/".to_string() } else { format!("/{trimmed}") }
}

fn strip_port(host: &str) -> &str {
  host.rsplit_once(':').map_or(host, |(h, port)| {
    if port.chars().all(|c| c.is_ascii_digit()) { h } else { host }
  })
}

impl Registry {
  pub fn validate(options: &I18nOptions) -> Result<Self, ConfigError> {
    let strategy: Strategy = options.strategy.parse()?;

    if options.locales.is_empty() {
      return Err(ConfigError::EmptyLocales);
    }
    let mut seen = HashSet::new();
    let mut locales = Vec::with_capacity(options.locales.len());
    for entry in &options.locales {
      let spec = entry.clone().into_spec();
      if !seen.insert(spec.code.clone()) {
        return Err(ConfigError::DuplicateLocale(spec.code));
      }
      locales.push(Locale {
        code: spec.code,
        iso: spec.iso,
        name: spec.name,
        domain: spec.domain,
        file: spec.file,
        fallback: spec.fallback,
      });
    }

    let default_locale = match (&options.default_locale, locales.as_slice()) {
      (Some(code), _) => code.clone(),
      (None, [only]) => only.code.clone(),
      (None, _) => return Err(ConfigError::MissingDefaultLocale),
    };
    if !seen.contains(&default_locale) {
      return Err(ConfigError::UnknownDefaultLocale(default_locale));
    }

    let fallbacks = locales.iter().filter_map(|l| l.fallback.as_ref());
    for fallback in fallbacks.chain(&options.fallback_locale) {
      if !seen.contains(fallback) {
        return Err(ConfigError::UnknownFallbackLocale(fallback.clone()));
      }
    }

    let base_url = match options.base_url.as_deref() {
      Some(raw) => {
        Some(Url::parse(raw).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_string()))?)
      }
      None => None,
    };

    let mut warnings = Vec::new();
    let mut different_domains = options.different_domains;
    if different_domains && strategy == Strategy::NoPrefix {
      warnings.push(ConfigWarning::IncompatibleDifferentDomains);
      different_domains = false;
    }
    if different_domains
      && let Some(missing) = locales.iter().find(|l| l.domain.is_none())
    {
      return Err(ConfigError::MissingDomain(missing.code.clone()));
    }
    if options.seo {
      let missing = locales.iter().filter(|l| l.iso.is_none());
      warnings.extend(missing.map(|l| ConfigWarning::MissingIso(l.code.clone())));
    }
    for w in &warnings {
      warn!("{w}");
    }

    Ok(Self {
      locales,
      default_locale,
      strategy,
      different_domains,
      fallback_locale: options.fallback_locale.clone(),
      seo: options.seo,
      base_url,
      router_base: normalize_base(&options.router.base),
      router_mode: options.router.mode,
      separator: options.route_name_separator.clone(),
      default_suffix: options.default_locale_route_name_suffix.clone(),
      detect: options.detect_browser_language.options(),
      lazy: options.lazy,
      lang_dir: options.lang_dir.clone(),
      warnings,
    })
  }

  pub fn locales(&self) -> &[Locale] {
    &self.locales
  }

  pub fn codes(&self) -> impl Iterator<Item = &str> {
    self.locales.iter().map(|l| l.code.as_str())
  }

  pub fn locale(&self, code: &str) -> Option<&Locale> {
    self.locales.iter().find(|l| l.code == code)
  }

  pub fn contains(&self, code: &str) -> bool {
    self.locale(code).is_some()
  }

  pub fn default_locale(&self) -> &str {
    &self.default_locale
  }

  pub fn is_default(&self, code: &str) -> bool {
    self.default_locale == code
  }

  pub fn strategy(&self) -> Strategy {
    self.strategy
  }

  /// Effective flag: always false under `no_prefix`.
  pub fn different_domains(&self) -> bool {
    self.different_domains
  }

  pub fn seo(&self) -> bool {
    self.seo
  }

  pub fn base_url(&self) -> Option<&Url> {
    self.base_url.as_ref()
  }

  pub fn router_base(&self) -> &str {
    &self.router_base
  }

  pub fn router_mode(&self) -> RouterMode {
    self.router_mode
  }

  pub fn detect(&self) -> Option<&DetectOptions> {
    self.detect.as_ref()
  }

  pub fn lazy(&self) -> bool {
    self.lazy
  }

  pub fn lang_dir(&self) -> Option<&str> {
    self.lang_dir.as_deref()
  }

  pub fn warnings(&self) -> &[ConfigWarning] {
    &self.warnings
  }

  /// Locale bound to a `Host` header value (port ignored, case-insensitive).
  pub fn domain_locale(&self, host: &str) -> Option<&Locale> {
    let host = strip_port(host.trim());
    self
      .locales
      .iter()
      .find(|l| l.domain.as_deref().is_some_and(|d| strip_port(d).eq_ignore_ascii_case(host)))
  }

  /// Message lookup order: the locale, its own fallback, then the global fallback.
  pub fn fallback_chain<'a>(&'a self, code: &'a str) -> Vec<&'a str> {
    let mut chain = vec![code];
    let own = self.locale(code).and_then(|l| l.fallback.as_deref());
    for next in own.into_iter().chain(self.fallback_locale.as_deref()) {
      if !chain.contains(&next) {
        chain.push(next);
      }
    }
    chain
  }

  pub fn localized_name(&self, base: &str, locale: &str) -> String {
    format!("{base}{}{locale}", self.separator)
  }

  /// Name of the unprefixed default-locale copy under `prefix_and_default`.
  pub fn default_alias_name(&self, base: &str) -> String {
    format!("{base}{sep}{}{sep}{}", self.default_locale, self.default_suffix, sep = self.separator)
  }

  /// Strip the locale suffix from a generated route name: `index___fr` -> `index`.
  pub fn base_name<'a>(&self, name: &'a str) -> &'a str {
    name.split_once(self.separator.as_str()).map_or(name, |(base, _)| base)
  }

  /// Apply `router.base` (and hash mode) to a base-relative path.
  pub fn public_path(&self, path: &str) -> String {
    let base = self.router_base.trim_end_matches('/');
    match self.router_mode {
      RouterMode::History => format!("{base}{path}"),
      RouterMode::Hash => format!("{base}/#{path}"),
    }
  }

  /// Absolute URL for SEO hrefs. Uses the locale's domain in differentDomains mode,
  /// else `base_url`; relative when neither applies.
  pub fn absolute_url(&self, locale: &str, path: &str) -> String {
    let public = self.public_path(path);
    if self.different_domains
      && let Some(domain) = self.locale(locale).and_then(|l| l.domain.as_deref())
    {
      return self.domain_url(domain, &public);
    }
    match &self.base_url {
      Some(url) => format!("{}{public}", url.as_str().trim_end_matches('/')),
      None => public,
    }
  }

  pub(crate) fn domain_url(&self, domain: &str, public_path: &str) -> String {
    if domain.contains("://") {
      return format!("{}{public_path}", domain.trim_end_matches('/'));
    }
    let scheme = self.base_url.as_ref().map_or("https", Url::scheme);
    format!("{scheme}://{domain}{public_path}")
  }
}
