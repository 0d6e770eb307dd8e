/* src/cli/core/src/config/mod.rs */

mod loader;


use serde::Deserialize;

pub use loader::{find_config, setup};

use seam_i18n::I18nOptions;

pub const CONFIG_FILE: &str = "i18n.toml";

/// Contents of `i18n.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// Page tree JSON produced by page discovery, relative to the config file.
  #[serde(default = "default_page_tree")]
  pub page_tree: String,
  pub i18n: I18nOptions,
}

fn default_page_tree() -> String {
  "pages.json".to_string()
}
