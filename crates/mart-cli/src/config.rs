//! Runtime configuration, layered from defaults, `mart.toml` and `MART_*`
//! environment variables.

use std::path::{Path, PathBuf};

use mart_core::IfExists;
use serde::Deserialize;

pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_MART_DIR: &str = "data/mart";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MartConfig {
  /// Directory holding the raw Olist CSV files.
  pub raw_dir:       PathBuf,
  /// Directory the mart CSV files are written to.
  pub mart_dir:      PathBuf,
  /// SQLite database for `load-raw` and `--sink sqlite`. Required only by
  /// those.
  #[serde(default)]
  pub database_path: Option<PathBuf>,
  #[serde(default)]
  pub if_exists:     IfExists,
}

impl Default for MartConfig {
  fn default() -> Self {
    Self {
      raw_dir:       DEFAULT_RAW_DIR.into(),
      mart_dir:      DEFAULT_MART_DIR.into(),
      database_path: None,
      if_exists:     IfExists::default(),
    }
  }
}

impl MartConfig {
  /// Load from `path` (if it exists) and the environment, over the defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("raw_dir", DEFAULT_RAW_DIR)?
      .set_default("mart_dir", DEFAULT_MART_DIR)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("MART"))
      .build()?
      .try_deserialize()
  }

  /// The configured database, or a precondition error naming the setting.
  pub fn require_database_path(&self) -> mart_core::Result<&Path> {
    self
      .database_path
      .as_deref()
      .ok_or(mart_core::Error::MissingSetting("database_path"))
  }
}
