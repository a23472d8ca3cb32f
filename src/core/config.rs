use crate::core::error::{DepotResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for bundle-depot
/// Searched in order: depot.toml, .depot.toml, .config/depot.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotConfig {
  /// Directory (relative to the current directory) that holds one
  /// sub-directory per bundle
  #[serde(default = "default_bundles_root")]
  pub bundles_root: PathBuf,

  /// Host used when building download URLs for index entries
  #[serde(default = "default_host")]
  pub host: String,

  /// Optional command run in the bundle directory before archiving, to
  /// materialize declared dependencies (best-effort)
  #[serde(default)]
  pub dependency_command: Option<String>,
}

fn default_bundles_root() -> PathBuf {
  PathBuf::from("bundles")
}

fn default_host() -> String {
  "raw.githubusercontent.com".to_string()
}

impl Default for DepotConfig {
  fn default() -> Self {
    Self {
      bundles_root: default_bundles_root(),
      host: default_host(),
      dependency_command: None,
    }
  }
}

impl DepotConfig {
  /// Find config file in search order: depot.toml, .depot.toml, .config/depot.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("depot.toml"),
      path.join(".depot.toml"),
      path.join(".config").join("depot.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no config file exists
  pub fn load_or_default(path: &Path) -> DepotResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: DepotConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    Ok(config)
  }
}
