/* src/cli/core/src/commands.rs */

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use seam_i18n::{
  I18nRouter, LazyFileMessages, Outcome, RequestInfo, Resolution, RouteTable, translate,
};
use tracing::debug;

use crate::ui::{self, CYAN, DIM, RESET, YELLOW};

/// Aligned `NAME  LOCALE  PATH` listing, header first.
pub fn format_routes(table: &RouteTable) -> Vec<String> {
  let rows: Vec<[String; 3]> = table
    .routes()
    .iter()
    .map(|r| {
      [
        r.name.clone().unwrap_or_else(|| "-".to_string()),
        r.locale.clone().unwrap_or_else(|| "*".to_string()),
        r.full_path.clone(),
      ]
    })
    .collect();
  let header = ["NAME", "LOCALE", "PATH"];
  let mut widths = header.map(str::len);
  for row in &rows {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.len());
    }
  }
  let mut lines = vec![ui::row(&header, &widths)];
  lines.extend(rows.iter().map(|r| ui::row(&[&r[0], &r[1], &r[2]], &widths)));
  lines
}

pub fn run_routes(router: &I18nRouter, json: bool) -> Result<()> {
  if json {
    let out =
      serde_json::to_string_pretty(router.table()).context("failed to serialize routes")?;
    println!("{out}");
    return Ok(());
  }
  ui::banner("routes");
  for line in format_routes(router.table()) {
    ui::detail(&line);
  }
  ui::blank();
  Ok(())
}

pub fn run_check(router: &I18nRouter) {
  let registry = router.registry();
  ui::banner("check");
  let codes: Vec<&str> = registry.codes().collect();
  ui::ok(&format!(
    "{} locales ({}), default \"{}\"",
    codes.len(),
    codes.join(", "),
    registry.default_locale()
  ));
  ui::ok(&format!("strategy {}", registry.strategy()));
  if registry.different_domains() {
    ui::ok("differentDomains enabled");
  }
  ui::ok(&format!("{} routes generated", router.table().len()));
  for warning in registry.warnings() {
    ui::warn(&warning.to_string());
  }
  ui::blank();
}

pub struct ResolveArgs<'a> {
  pub path: &'a str,
  pub host: Option<&'a str>,
  pub cookie: Option<&'a str>,
  pub accept_language: Option<&'a str>,
  pub json: bool,
}

fn status_line(router: &I18nRouter, res: &Resolution) -> String {
  match res.outcome {
    Outcome::Render => "200 render".to_string(),
    Outcome::Redirect(ref location) => {
      format!("302 redirect -> {}", router.registry().public_path(location))
    }
    Outcome::NotFound => "404 not found".to_string(),
  }
}

pub fn run_resolve(router: &I18nRouter, args: &ResolveArgs<'_>) -> Result<()> {
  let req = RequestInfo {
    path: args.path,
    query: None,
    host: args.host,
    cookie_header: args.cookie,
    accept_language: args.accept_language,
  };
  let res = router.resolve(&req);
  let paths = router.paths();
  let switch: Vec<(&str, Option<String>)> = router
    .registry()
    .codes()
    .map(|code| (code, paths.switch_locale_path(&res.context, code)))
    .collect();
  let head = router.seo().build(&res.context);

  if args.json {
    let switch: BTreeMap<&str, Option<String>> = switch.into_iter().collect();
    let out = serde_json::json!({
      "resolution": res,
      "status": res.status(),
      "switch_locale_paths": switch,
      "seo": head,
    });
    let out = serde_json::to_string_pretty(&out).context("failed to serialize resolution")?;
    println!("{out}");
    return Ok(());
  }

  ui::banner("resolve");
  ui::arrow(args.path);
  let locale = &res.context.locale;
  ui::detail(&format!("locale   {CYAN}{locale}{RESET} {DIM}({:?}){RESET}", res.source));
  ui::detail(&format!("status   {}", status_line(router, &res)));
  if let Some(name) = paths.route_base_name(&res.context) {
    ui::detail(&format!("route    {name}"));
  }
  if let Some(ref code) = res.set_cookie {
    ui::detail(&format!("cookie   {YELLOW}set{RESET} {code}"));
  }
  for (code, target) in &switch {
    let shown = target.as_deref().unwrap_or("-");
    ui::detail(&format!("switch   {code:<6} {shown}"));
  }
  for tag in &head.tags {
    ui::detail(&format!("{DIM}{}{RESET}", tag.render()));
  }
  ui::blank();
  Ok(())
}

pub async fn run_translate(
  router: &I18nRouter,
  base_dir: &Path,
  locale: &str,
  key: &str,
) -> Result<()> {
  let registry = router.registry();
  if !registry.contains(locale) {
    bail!("unknown locale \"{locale}\"");
  }
  let Some(lang_dir) = registry.lang_dir() else {
    bail!("i18n.lang_dir is not set");
  };
  let source = LazyFileMessages::new(registry, base_dir.join(lang_dir));
  if !registry.lazy() {
    let loaded = source.preload().await;
    debug!("preloaded {loaded} message files from {lang_dir}");
  }
  match translate(&source, registry, locale, key).await {
    Some(message) => {
      println!("{message}");
      Ok(())
    }
    None => {
      ui::fail(&format!("no message for \"{key}\" in \"{locale}\" or its fallbacks"));
      bail!("missing message")
    }
  }
}
