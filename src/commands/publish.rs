//! The publish command: bump, package, index, push

use crate::core::config::DepotConfig;
use crate::core::depot::{Depot, DepotOptions};
use crate::core::error::{DepotResult, ResultExt};
use std::env;

/// Arguments collected from the CLI
pub struct PublishArgs {
  pub bundle: String,
  pub version: Option<String>,
  pub app_version: Option<String>,
  pub owner: String,
  pub repository: String,
  pub branch: String,
  pub keep_last_releases: usize,
  pub remote: Option<String>,
}

/// Run the full update-and-publish flow for one bundle
pub fn run_publish(args: PublishArgs) -> DepotResult<()> {
  let cwd = env::current_dir().context("Failed to get current directory")?;
  let config = DepotConfig::load_or_default(&cwd)?;

  // Fresh working directory per invocation; the path is printed so the
  // packaged archives can be inspected after the run
  let workdir = tempfile::TempDir::new()
    .context("Failed to create working directory")?
    .keep();
  println!("{}", workdir.display());

  let options = DepotOptions {
    bundles_root: cwd.join(&config.bundles_root),
    owner: args.owner,
    repository: args.repository,
    branch: args.branch,
    workdir: workdir.clone(),
    host: config.host.clone(),
    remote: args.remote,
    dependency_command: config.dependency_command.clone(),
  };

  let mut depot = Depot::open(options)?;
  depot.update_bundle(&args.bundle, args.version.as_deref(), args.app_version.as_deref())?;
  let archive = depot.package_bundle(&args.bundle, &workdir, args.keep_last_releases)?;

  println!("📦 Packaged {}", archive.display());
  println!(
    "✅ Index now tracks {} release(s) for '{}'",
    depot.index().versions(&args.bundle).len(),
    args.bundle
  );

  Ok(())
}
