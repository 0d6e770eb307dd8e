/* src/i18n/adapter/axum/src/handler.rs */

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use seam_i18n::{I18nError, I18nRouter, Outcome, RequestInfo, SeoHead};
use tracing::debug;

use crate::error::AxumError;
use crate::{PageContext, PageRenderer};

pub(crate) struct AppState {
  router: I18nRouter,
  renderer: PageRenderer,
}

pub(crate) fn build_router(router: I18nRouter, renderer: PageRenderer) -> Router {
  let state = Arc::new(AppState { router, renderer });
  Router::new()
    .route("/_i18n/routes.json", get(handle_routes))
    .fallback(handle_page)
    .with_state(state)
}

async fn handle_routes(State(state): State<Arc<AppState>>) -> Result<Response, AxumError> {
  let json = serde_json::to_value(state.router.table())
    .map_err(|e| I18nError::internal(format!("route table serialization: {e}")))?;
  Ok(axum::Json(json).into_response())
}

/// Request path relative to `router.base`; None when outside of it.
fn strip_base<'a>(base: &str, path: &'a str) -> Option<&'a str> {
  if base == "/" {
    return Some(path);
  }
  match path.strip_prefix(base) {
    Some("") => Some("/"),
    Some(rest) if rest.starts_with('/') => Some(rest),
    _ => None,
  }
}

fn header_str<'h>(headers: &'h HeaderMap, name: header::HeaderName) -> Option<&'h str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_value(value: &str) -> Result<HeaderValue, AxumError> {
  HeaderValue::from_str(value)
    .map_err(|_| AxumError(I18nError::internal(format!("invalid header value: {value}"))))
}

/// Set `<html lang>` and insert head tags and the locale state script.
fn inject(mut html: String, seo: &SeoHead, state_json: &str) -> String {
  if !html.contains("<html lang") {
    html = html.replacen("<html", &format!("<html lang=\"{}\"", seo.html_lang), 1);
  }
  let tags = seo.render();
  if !tags.is_empty() {
    match html.find("</head>") {
      Some(pos) => html.insert_str(pos, &tags),
      None => html.insert_str(0, &tags),
    }
  }
  // `</` inside the payload would close the script element early
  let state_json = state_json.replace("</", "<\\/");
  let script = format!(r#"<script id="__i18n" type="application/json">{state_json}</script>"#);
  if let Some(pos) = html.rfind("</body>") {
    html.insert_str(pos, &script);
  } else {
    html.push_str(&script);
  }
  html
}

async fn handle_page(
  State(state): State<Arc<AppState>>,
  uri: Uri,
  headers: HeaderMap,
) -> Result<Response, AxumError> {
  let registry = state.router.registry();
  let Some(path) = strip_base(registry.router_base(), uri.path()) else {
    return Err(I18nError::not_found(format!("{} is outside the router base", uri.path())).into());
  };

  let req = RequestInfo {
    path,
    query: uri.query(),
    host: header_str(&headers, header::HOST).or_else(|| uri.host()),
    cookie_header: header_str(&headers, header::COOKIE),
    accept_language: header_str(&headers, header::ACCEPT_LANGUAGE),
  };
  let res = state.router.resolve(&req);
  let set_cookie = match (&res.set_cookie, registry.detect()) {
    (Some(code), Some(detect)) => {
      Some(header_value(&format!("{}={code}; Path=/; SameSite=Lax", detect.cookie_key))?)
    }
    _ => None,
  };

  let mut response = match res.outcome {
    Outcome::NotFound => {
      debug!("i18n: 404 for {}", uri.path());
      return Err(I18nError::not_found(format!("no route matches {}", uri.path())).into());
    }
    Outcome::Redirect(ref location) => {
      let location = header_value(&registry.public_path(location))?;
      (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
    }
    Outcome::Render => {
      let seo = state.router.seo().build(&res.context);
      let page = PageContext { context: res.context, seo, router: state.router.clone() };
      let state_json = serde_json::to_string(&page.state())
        .map_err(|e| I18nError::internal(format!("locale state serialization: {e}")))?;
      let seo = page.seo.clone();
      let html = (state.renderer)(page).await?;
      Html(inject(html, &seo, &state_json)).into_response()
    }
  };

  if let Some(cookie) = set_cookie {
    response.headers_mut().insert(header::SET_COOKIE, cookie);
  }
  Ok(response)
}
