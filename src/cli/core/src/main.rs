/* src/cli/core/src/main.rs */

mod commands;
mod config;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::ResolveArgs;

#[derive(Parser)]
#[command(name = "seam-i18n", about = "Inspect locale-aware routing for a seam project")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List the generated localized routes
  Routes {
    /// Path to i18n.toml (searched upward from cwd when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the route table as JSON
    #[arg(long)]
    json: bool,
  },
  /// Validate the configuration and report warnings
  Check {
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Resolve a request path the way the server would
  Resolve {
    /// Request path, e.g. /fr/about
    path: String,
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Host header value
    #[arg(long)]
    host: Option<String>,
    /// Raw Cookie header value
    #[arg(long)]
    cookie: Option<String>,
    /// Accept-Language header value
    #[arg(long)]
    accept_language: Option<String>,
    #[arg(long)]
    json: bool,
  },
  /// Look up a message key with locale fallback
  Translate {
    key: String,
    #[arg(short, long)]
    locale: String,
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

fn resolve_config(explicit: Option<PathBuf>) -> Result<PathBuf> {
  match explicit {
    Some(path) => Ok(path),
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      config::find_config(&cwd)
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive("seam_i18n=info".parse()?))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  match cli.command {
    Command::Routes { config, json } => {
      let router = config::setup(&resolve_config(config)?)?;
      commands::run_routes(&router, json)?;
    }
    Command::Check { config } => {
      let router = config::setup(&resolve_config(config)?)?;
      commands::run_check(&router);
    }
    Command::Resolve { path, config, host, cookie, accept_language, json } => {
      let router = config::setup(&resolve_config(config)?)?;
      let args = ResolveArgs {
        path: &path,
        host: host.as_deref(),
        cookie: cookie.as_deref(),
        accept_language: accept_language.as_deref(),
        json,
      };
      commands::run_resolve(&router, &args)?;
    }
    Command::Translate { key, locale, config } => {
      let config_path = resolve_config(config)?;
      let router = config::setup(&config_path)?;
      let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
      commands::run_translate(&router, base_dir, &locale, &key).await?;
    }
  }
  Ok(())
}
