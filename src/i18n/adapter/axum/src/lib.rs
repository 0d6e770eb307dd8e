/* src/i18n/adapter/axum/src/lib.rs */

mod error;
mod handler;

use std::future::Future;
use std::sync::Arc;

use seam_i18n::{
  ActiveLocaleContext, BoxFuture, I18nError, I18nRouter, Locale, RouteTarget, SeoHead,
};
use serde::Serialize;
use tracing::info;

/// Re-export seam-i18n core for convenience
pub use seam_i18n;

/// Everything a page renderer needs for the current request.
pub struct PageContext {
  pub context: ActiveLocaleContext,
  pub seo: SeoHead,
  router: I18nRouter,
}

/// Locale state handed to the client as JSON.
#[derive(Debug, Serialize)]
pub struct LocaleState<'a> {
  pub locale: &'a str,
  pub locales: &'a [Locale],
  #[serde(skip_serializing_if = "Option::is_none")]
  pub route_name: Option<&'a str>,
}

impl PageContext {
  pub fn locale(&self) -> &str {
    &self.context.locale
  }

  pub fn locales(&self) -> &[Locale] {
    self.router.registry().locales()
  }

  pub fn locale_path(&self, target: impl Into<RouteTarget>, locale: Option<&str>) -> String {
    self.router.paths().locale_path(&self.context, target, locale)
  }

  pub fn switch_locale_path(&self, locale: &str) -> Option<String> {
    self.router.paths().switch_locale_path(&self.context, locale)
  }

  pub fn route_base_name(&self) -> Option<&str> {
    self.context.route_name.as_deref()
  }

  pub fn state(&self) -> LocaleState<'_> {
    LocaleState {
      locale: self.locale(),
      locales: self.locales(),
      route_name: self.route_base_name(),
    }
  }
}

pub type PageRenderer =
  Arc<dyn Fn(PageContext) -> BoxFuture<'static, Result<String, I18nError>> + Send + Sync>;

/// Localized router plus the renderer producing HTML for matched pages.
pub struct I18nApp {
  router: I18nRouter,
  renderer: PageRenderer,
}

impl I18nApp {
  pub fn new<F, Fut>(router: I18nRouter, render: F) -> Self
  where
    F: Fn(PageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, I18nError>> + Send + 'static,
  {
    let renderer: PageRenderer =
      Arc::new(move |page: PageContext| -> BoxFuture<'static, Result<String, I18nError>> {
        Box::pin(render(page))
      });
    Self { router, renderer }
  }
}

/// Extension trait that converts an `I18nApp` into an Axum router.
pub trait IntoAxumRouter {
  fn into_axum_router(self) -> axum::Router;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for I18nApp {
  fn into_axum_router(self) -> axum::Router {
    handler::build_router(self.router, self.renderer)
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = self.into_axum_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!("i18n app running on http://localhost:{}", local_addr.port());
    axum::serve(listener, router).await?;
    Ok(())
  }
}
