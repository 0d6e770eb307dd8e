/* src/i18n/core/rust/src/config.rs */

use std::collections::BTreeMap;

use serde::Deserialize;

pub const DEFAULT_COOKIE_KEY: &str = "i18n_redirected";

/// Merged i18n configuration as handed over by the framework glue.
#[derive(Debug, Clone, Deserialize)]
pub struct I18nOptions {
  /// Raw strategy name; validated into `Strategy` at setup.
  #[serde(default = "default_strategy")]
  pub strategy: String,
  pub locales: Vec<LocaleOption>,
  #[serde(default)]
  pub default_locale: Option<String>,
  #[serde(default)]
  pub different_domains: bool,
  #[serde(default = "default_true")]
  pub parse_pages: bool,
  /// Base route name (or base path) -> per-locale custom paths, or `false`.
  #[serde(default)]
  pub pages: BTreeMap<String, PageConfig>,
  #[serde(default)]
  pub lazy: bool,
  #[serde(default)]
  pub lang_dir: Option<String>,
  /// Global message fallback (`vueI18n.fallbackLocale`).
  #[serde(default)]
  pub fallback_locale: Option<String>,
  #[serde(default = "default_true")]
  pub seo: bool,
  #[serde(default)]
  pub base_url: Option<String>,
  #[serde(default)]
  pub router: RouterOptions,
  #[serde(default = "default_separator")]
  pub route_name_separator: String,
  #[serde(default = "default_route_suffix")]
  pub default_locale_route_name_suffix: String,
  #[serde(default)]
  pub detect_browser_language: DetectBrowserLanguage,
}

/// A locale entry: either a bare code or a full table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocaleOption {
  Code(String),
  Full(LocaleSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleSpec {
  pub code: String,
  #[serde(default)]
  pub iso: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub domain: Option<String>,
  #[serde(default)]
  pub file: Option<String>,
  #[serde(default)]
  pub fallback: Option<String>,
}

impl LocaleOption {
  pub fn code(&self) -> &str {
    match self {
      Self::Code(code) => code,
      Self::Full(spec) => &spec.code,
    }
  }

  pub fn into_spec(self) -> LocaleSpec {
    match self {
      Self::Code(code) => {
        LocaleSpec { code, iso: None, name: None, domain: None, file: None, fallback: None }
      }
      Self::Full(spec) => spec,
    }
  }
}

/// Entry of the `pages` map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PageConfig {
  /// `false` keeps the route unlocalized; `true` is a no-op.
  Toggle(bool),
  Paths(BTreeMap<String, PathOverride>),
}

/// Per-locale value: a custom path, `false` to disable, `true` for the default path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathOverride {
  Path(String),
  Toggle(bool),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
  #[default]
  History,
  Hash,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterOptions {
  #[serde(default = "default_base")]
  pub base: String,
  #[serde(default)]
  pub mode: RouterMode,
}

impl Default for RouterOptions {
  fn default() -> Self {
    Self { base: default_base(), mode: RouterMode::default() }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectOn {
  #[default]
  All,
  Root,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetectOptions {
  #[serde(default = "default_true")]
  pub use_cookie: bool,
  #[serde(default = "default_cookie_key")]
  pub cookie_key: String,
  #[serde(default)]
  pub redirect_on: RedirectOn,
}

impl Default for DetectOptions {
  fn default() -> Self {
    Self { use_cookie: true, cookie_key: default_cookie_key(), redirect_on: RedirectOn::default() }
  }
}

/// `detect_browser_language = false` disables cookie and header detection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DetectBrowserLanguage {
  Toggle(bool),
  Options(DetectOptions),
}

impl Default for DetectBrowserLanguage {
  fn default() -> Self {
    Self::Options(DetectOptions::default())
  }
}

impl DetectBrowserLanguage {
  pub fn options(&self) -> Option<DetectOptions> {
    match self {
      Self::Toggle(false) => None,
      Self::Toggle(true) => Some(DetectOptions::default()),
      Self::Options(opts) => Some(opts.clone()),
    }
  }
}

impl I18nOptions {
  /// Minimal options: the given codes, first one as default, default strategy.
  pub fn new(codes: &[&str]) -> Self {
    Self {
      strategy: default_strategy(),
      locales: codes.iter().map(|c| LocaleOption::Code((*c).to_string())).collect(),
      default_locale: codes.first().map(|c| (*c).to_string()),
      different_domains: false,
      parse_pages: true,
      pages: BTreeMap::new(),
      lazy: false,
      lang_dir: None,
      fallback_locale: None,
      seo: true,
      base_url: None,
      router: RouterOptions::default(),
      route_name_separator: default_separator(),
      default_locale_route_name_suffix: default_route_suffix(),
      detect_browser_language: DetectBrowserLanguage::default(),
    }
  }
}

fn default_strategy() -> String {
  "prefix_except_default".to_string()
}

fn default_true() -> bool {
  true
}

fn default_base() -> String {
  "/".to_string()
}

fn default_separator() -> String {
  "___".to_string()
}

fn default_route_suffix() -> String {
  "default".to_string()
}

fn default_cookie_key() -> String {
  DEFAULT_COOKIE_KEY.to_string()
}
