/* src/i18n/core/rust/src/messages.rs */

// Message lookup with locale fallback. Sources are async so lazily loaded
// files never block route resolution; callers await only when rendering text.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::I18nError;
use crate::registry::Registry;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait MessageSource: Send + Sync {
  /// Message for `key` in exactly `locale`. `Ok(None)` when absent or empty.
  fn lookup<'a>(
    &'a self,
    locale: &'a str,
    key: &'a str,
  ) -> BoxFuture<'a, Result<Option<String>, I18nError>>;
}

/// Flat key first, then a dotted path through nested objects. Empty strings count as missing.
fn get_message(data: &Value, key: &str) -> Option<String> {
  let direct = data.get(key);
  let nested = || key.split('.').try_fold(data, |node, part| node.get(part));
  let value = direct.or_else(nested)?;
  value.as_str().filter(|s| !s.is_empty()).map(String::from)
}

/// In-memory messages keyed by locale code.
#[derive(Debug, Clone, Default)]
pub struct StaticMessages {
  messages: BTreeMap<String, Value>,
}

impl StaticMessages {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_locale(mut self, locale: &str, messages: Value) -> Self {
    self.messages.insert(locale.to_string(), messages);
    self
  }
}

impl MessageSource for StaticMessages {
  fn lookup<'a>(
    &'a self,
    locale: &'a str,
    key: &'a str,
  ) -> BoxFuture<'a, Result<Option<String>, I18nError>> {
    let found = self.messages.get(locale).and_then(|data| get_message(data, key));
    Box::pin(async move { Ok(found) })
  }
}

/// JSON message files under `lang_dir`, read on first use and cached.
pub struct LazyFileMessages {
  dir: PathBuf,
  files: HashMap<String, String>,
  cache: RwLock<HashMap<String, Arc<Value>>>,
}

impl LazyFileMessages {
  /// File per locale: its `file` option, else `<code>.json`.
  pub fn new(registry: &Registry, dir: impl Into<PathBuf>) -> Self {
    let files = registry
      .locales()
      .iter()
      .map(|l| (l.code.clone(), l.file.clone().unwrap_or_else(|| format!("{}.json", l.code))))
      .collect();
    Self { dir: dir.into(), files, cache: RwLock::new(HashMap::new()) }
  }

  /// Built from `lang_dir`; None when it is unset.
  pub fn from_registry(registry: &Registry) -> Option<Self> {
    registry.lang_dir().map(|dir| Self::new(registry, dir))
  }

  /// Read every locale's file now instead of on first lookup. Failures are logged and
  /// left for lookups to degrade on. Returns how many files loaded.
  pub async fn preload(&self) -> usize {
    let mut locales: Vec<&str> = self.files.keys().map(String::as_str).collect();
    locales.sort_unstable();
    let mut loaded = 0;
    for locale in locales {
      match self.load(locale).await {
        Ok(_) => loaded += 1,
        Err(e) => warn!("i18n: preloading messages for \"{locale}\" failed: {e}"),
      }
    }
    loaded
  }

  async fn load(&self, locale: &str) -> Result<Arc<Value>, I18nError> {
    if let Some(data) = self.cache.read().await.get(locale) {
      return Ok(data.clone());
    }
    let file = self
      .files
      .get(locale)
      .ok_or_else(|| I18nError::not_found(format!("no message file for locale \"{locale}\"")))?;
    let path = self.dir.join(file);
    let raw = tokio::fs::read_to_string(&path)
      .await
      .map_err(|e| I18nError::internal(format!("failed to read {}: {e}", path.display())))?;
    let data: Value = serde_json::from_str(&raw)
      .map_err(|e| I18nError::internal(format!("failed to parse {}: {e}", path.display())))?;
    let data = Arc::new(data);
    self.cache.write().await.insert(locale.to_string(), data.clone());
    debug!("i18n: loaded messages for \"{locale}\" from {}", path.display());
    Ok(data)
  }
}

impl MessageSource for LazyFileMessages {
  fn lookup<'a>(
    &'a self,
    locale: &'a str,
    key: &'a str,
  ) -> BoxFuture<'a, Result<Option<String>, I18nError>> {
    Box::pin(async move {
      let data = self.load(locale).await?;
      Ok(get_message(&data, key))
    })
  }
}

/// Walk the locale's fallback chain (one hop each). Load failures degrade to the next hop.
pub async fn translate(
  source: &dyn MessageSource,
  registry: &Registry,
  locale: &str,
  key: &str,
) -> Option<String> {
  for hop in registry.fallback_chain(locale) {
    match source.lookup(hop, key).await {
      Ok(Some(message)) => return Some(message),
      Ok(None) => {}
      Err(e) => warn!("i18n: messages for \"{hop}\" unavailable: {e}"),
    }
  }
  debug!("i18n: no message for key \"{key}\" in \"{locale}\" or its fallbacks");
  None
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::config::{I18nOptions, LocaleOption, LocaleSpec};

  fn registry(lang_dir: Option<String>) -> Registry {
    let mut opts = I18nOptions::new(&["en", "fr"]);
    opts.locales.push(LocaleOption::Full(LocaleSpec {
      code: "fr-CA".into(),
      iso: None,
      name: None,
      domain: None,
      file: Some("canada.json".into()),
      fallback: Some("fr".into()),
    }));
    opts.fallback_locale = Some("en".into());
    opts.lang_dir = lang_dir;
    Registry::validate(&opts).unwrap()
  }

  fn source() -> StaticMessages {
    StaticMessages::new()
      .with_locale("en", json!({ "hello": "Hello", "nav": { "home": "Home" }, "bye": "Bye" }))
      .with_locale("fr", json!({ "hello": "Bonjour", "bye": "" }))
      .with_locale("fr-CA", json!({ "hello": "Allo" }))
  }

  #[test]
  fn nested_and_flat_keys() {
    let data = json!({ "a.b": "flat", "nav": { "home": "Home" }, "empty": "" });
    assert_eq!(get_message(&data, "a.b").as_deref(), Some("flat"));
    assert_eq!(get_message(&data, "nav.home").as_deref(), Some("Home"));
    assert_eq!(get_message(&data, "empty"), None);
    assert_eq!(get_message(&data, "nav"), None);
  }

  #[tokio::test]
  async fn fallback_chain_lookup() {
    let reg = registry(None);
    let src = source();
    assert_eq!(translate(&src, &reg, "fr-CA", "hello").await.as_deref(), Some("Allo"));
    assert_eq!(translate(&src, &reg, "fr", "hello").await.as_deref(), Some("Bonjour"));
    // Empty fr value falls through to the global fallback
    assert_eq!(translate(&src, &reg, "fr-CA", "bye").await.as_deref(), Some("Bye"));
    assert_eq!(translate(&src, &reg, "fr", "nav.home").await.as_deref(), Some("Home"));
    assert_eq!(translate(&src, &reg, "fr", "missing").await, None);
  }

  #[tokio::test]
  async fn lazy_files_load_and_degrade() {
    let dir = std::env::temp_dir().join(format!("seam-i18n-messages-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("en.json"), r#"{ "hello": "Hello", "only_en": "EN" }"#).unwrap();
    std::fs::write(dir.join("canada.json"), r#"{ "hello": "Allo" }"#).unwrap();
    // fr.json missing: lookups degrade to en

    let reg = registry(Some(dir.to_string_lossy().into_owned()));
    let src = LazyFileMessages::from_registry(&reg).unwrap();
    assert_eq!(translate(&src, &reg, "fr-CA", "hello").await.as_deref(), Some("Allo"));
    assert_eq!(translate(&src, &reg, "fr-CA", "only_en").await.as_deref(), Some("EN"));
    assert!(src.lookup("fr", "hello").await.is_err());

    // Cached after first read
    std::fs::remove_file(dir.join("en.json")).unwrap();
    assert_eq!(src.lookup("en", "hello").await.unwrap().as_deref(), Some("Hello"));
    let _ = std::fs::remove_dir_all(&dir);
  }

  #[tokio::test]
  async fn preload_reads_every_file_up_front() {
    let dir = std::env::temp_dir().join(format!("seam-i18n-preload-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("en.json"), r#"{ "hello": "Hello" }"#).unwrap();
    std::fs::write(dir.join("fr.json"), r#"{ "hello": "Bonjour" }"#).unwrap();

    let reg = registry(Some(dir.to_string_lossy().into_owned()));
    let src = LazyFileMessages::from_registry(&reg).unwrap();
    // canada.json is missing
    assert_eq!(src.preload().await, 2);
    std::fs::remove_dir_all(&dir).unwrap();
    assert_eq!(src.lookup("fr", "hello").await.unwrap().as_deref(), Some("Bonjour"));
    assert_eq!(translate(&src, &reg, "fr-CA", "hello").await.as_deref(), Some("Bonjour"));
  }

  #[test]
  fn no_lang_dir_no_lazy_source() {
    assert!(LazyFileMessages::from_registry(&registry(None)).is_none());
  }
}
