//! Best-effort dependency resolution before archiving
//!
//! Some bundles declare external dependencies that must be materialized
//! into the bundle directory before it is packaged. The resolution step
//! is fire-and-forget: the coordinator logs failures and keeps going.

use crate::core::error::{DepotError, DepotResult, ResultExt};
use std::path::Path;
use std::process::Command;

/// Materializes a bundle's declared dependencies into its directory
pub trait DependencyResolver {
  fn resolve(&self, bundle_dir: &Path) -> DepotResult<()>;
}

/// Runs a configured shell command inside the bundle directory
///
/// With no command configured this is a no-op, which is the common case.
pub struct CommandResolver {
  command: Option<String>,
}

impl CommandResolver {
  pub fn new(command: Option<String>) -> Self {
    Self { command }
  }
}

impl DependencyResolver for CommandResolver {
  fn resolve(&self, bundle_dir: &Path) -> DepotResult<()> {
    let Some(command) = &self.command else {
      return Ok(());
    };

    let mut cmd = if cfg!(target_os = "windows") {
      let mut c = Command::new("cmd");
      c.arg("/C");
      c
    } else {
      let mut c = Command::new("sh");
      c.arg("-c");
      c
    };

    let output = cmd
      .arg(command)
      .current_dir(bundle_dir)
      .output()
      .with_context(|| format!("Failed to run dependency command '{}'", command))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(DepotError::message(format!(
        "Dependency command '{}' failed: {}",
        command,
        stderr.trim()
      )));
    }

    Ok(())
  }
}
