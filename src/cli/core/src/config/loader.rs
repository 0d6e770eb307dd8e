/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use seam_i18n::{I18nRouter, PageNode};

use super::{CONFIG_FILE, CliConfig};

/// Walk upward from `start` to find `i18n.toml`, like Cargo.toml discovery
pub fn find_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

fn load_config(path: &Path) -> Result<CliConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: CliConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  Ok(config)
}

fn load_pages(base_dir: &Path, config: &CliConfig) -> Result<Vec<PageNode>> {
  let path = base_dir.join(&config.page_tree);
  let content =
    std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
  let pages: Vec<PageNode> =
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  Ok(pages)
}

/// Load config and page tree, then build the router.
pub fn setup(path: &Path) -> Result<I18nRouter> {
  let config = load_config(path)?;
  let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
  let pages = load_pages(base_dir, &config)?;
  I18nRouter::setup(&config.i18n, &pages)
    .with_context(|| format!("invalid i18n configuration in {}", path.display()))
}
