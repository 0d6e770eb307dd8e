/* src/i18n/core/rust/src/errors.rs */

use std::fmt;

/// Fatal setup errors. Any of these aborts route-table generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid \"strategy\" option \"{0}\"")]
  InvalidStrategy(String),
  #[error("i18n: locales must not be empty")]
  EmptyLocales,
  #[error("i18n: duplicate locale code \"{0}\"")]
  DuplicateLocale(String),
  #[error("i18n: default_locale must be set when more than one locale is configured")]
  MissingDefaultLocale,
  #[error("i18n: default_locale \"{0}\" is not a configured locale")]
  UnknownDefaultLocale(String),
  #[error("i18n: fallback locale \"{0}\" is not a configured locale")]
  UnknownFallbackLocale(String),
  #[error("i18n: locale \"{0}\" has no domain but `differentDomains` is enabled")]
  MissingDomain(String),
  #[error("i18n: duplicate route name \"{0}\"")]
  DuplicateRouteName(String),
  #[error("i18n: invalid base_url \"{0}\"")]
  InvalidBaseUrl(String),
  #[error("i18n: invalid path template \"{path}\": {reason}")]
  InvalidPathTemplate { path: String, reason: String },
}

/// Request-time error carried to the rendering layer, with an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I18nError {
  code: String,
  message: String,
  status: u16,
}

fn default_status(code: &str) -> u16 {
  match code {
    "VALIDATION_ERROR" => 400,
    "NOT_FOUND" => 404,
    _ => 500,
  }
}

impl I18nError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
    Self { code: code.into(), message: message.into(), status }
  }

  pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
    let code = code.into();
    let status = default_status(&code);
    Self { code, message: message.into(), status }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::with_code("VALIDATION_ERROR", msg)
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_code("NOT_FOUND", msg)
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::with_code("INTERNAL_ERROR", msg)
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }
}

impl fmt::Display for I18nError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for I18nError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_strategy_message() {
    let err = ConfigError::InvalidStrategy("prefix_all".into());
    assert_eq!(err.to_string(), "Invalid \"strategy\" option \"prefix_all\"");
  }

  #[test]
  fn default_status_known_codes() {
    assert_eq!(default_status("VALIDATION_ERROR"), 400);
    assert_eq!(default_status("NOT_FOUND"), 404);
    assert_eq!(default_status("INTERNAL_ERROR"), 500);
    assert_eq!(default_status("CUSTOM"), 500);
  }

  #[test]
  fn convenience_constructors() {
    assert_eq!(I18nError::validation("x").status(), 400);
    assert_eq!(I18nError::not_found("x").status(), 404);
    assert_eq!(I18nError::internal("x").status(), 500);
    assert_eq!(I18nError::new("GONE", "x", 410).status(), 410);
  }

  #[test]
  fn display_format() {
    let err = I18nError::not_found("no route for /fr/about");
    assert_eq!(err.to_string(), "NOT_FOUND: no route for /fr/about");
  }
}
