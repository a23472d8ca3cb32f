//! Release index coordination: discovery, index mutation, publishing
//!
//! `Depot` owns the index document and every discovered bundle. One
//! instance corresponds to one update-and-publish run: construction
//! clones the index branch into a fresh working directory, and
//! `package_bundle` leaves that working copy committed and pushed.

use crate::core::error::{DepotError, DepotResult, ResultExt};
use crate::core::index::{INDEX_FILE, Index};
use crate::core::manifest::{Bundle, MANIFEST_FILE};
use crate::core::vcs::{SystemGit, Vcs};
use crate::pack::{Archiver, CommandResolver, DependencyResolver, TarGzArchiver};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything needed to open a depot for one run
pub struct DepotOptions {
  /// Directory holding one sub-directory per bundle
  pub bundles_root: PathBuf,
  /// Index repository owner/organization
  pub owner: String,
  /// Index repository name
  pub repository: String,
  /// Branch holding the release index
  pub branch: String,
  /// Fresh directory the index branch is cloned into
  pub workdir: PathBuf,
  /// Host used in published download URLs
  pub host: String,
  /// Clone URL override (defaults to the SSH form for owner/repository)
  pub remote: Option<String>,
  /// Optional dependency-resolution command
  pub dependency_command: Option<String>,
}

/// The release index coordinator
pub struct Depot {
  owner: String,
  repository: String,
  branch: String,
  host: String,
  workdir: PathBuf,
  bundles: BTreeMap<String, Bundle>,
  index: Index,
  vcs: Box<dyn Vcs>,
  archiver: Box<dyn Archiver>,
  resolver: Box<dyn DependencyResolver>,
}

impl Depot {
  /// Open a depot with the production backends (system git, tgz archiver,
  /// configured dependency command)
  pub fn open(options: DepotOptions) -> DepotResult<Self> {
    let resolver = CommandResolver::new(options.dependency_command.clone());
    Self::with_backends(options, Box::new(SystemGit), Box::new(TarGzArchiver), Box::new(resolver))
  }

  /// Open a depot with injected backends
  pub fn with_backends(
    options: DepotOptions,
    vcs: Box<dyn Vcs>,
    archiver: Box<dyn Archiver>,
    resolver: Box<dyn DependencyResolver>,
  ) -> DepotResult<Self> {
    let bundles = discover_bundles(&options.bundles_root)?;

    let remote = options
      .remote
      .clone()
      .unwrap_or_else(|| format!("git@github.com:{}/{}.git", options.owner, options.repository));
    vcs.clone_branch(&remote, &options.branch, &options.workdir)?;

    let index = Index::load(&options.workdir.join(INDEX_FILE))?;

    Ok(Self {
      owner: options.owner,
      repository: options.repository,
      branch: options.branch,
      host: options.host,
      workdir: options.workdir,
      bundles,
      index,
      vcs,
      archiver,
      resolver,
    })
  }

  /// Names of every discovered bundle
  pub fn bundle_names(&self) -> Vec<&str> {
    self.bundles.keys().map(String::as_str).collect()
  }

  pub fn index(&self) -> &Index {
    &self.index
  }

  /// Apply version updates to a bundle's manifest
  ///
  /// Each field is applied independently; passing neither is a legal
  /// no-op that leaves the manifest file untouched.
  pub fn update_bundle(&mut self, name: &str, version: Option<&str>, app_version: Option<&str>) -> DepotResult<()> {
    let bundle = self
      .bundles
      .get_mut(name)
      .ok_or_else(|| DepotError::UnknownBundle { name: name.to_string() })?;

    if let Some(version) = version.filter(|v| !v.is_empty()) {
      bundle.update_version(version)?;
    }
    if let Some(app_version) = app_version.filter(|v| !v.is_empty()) {
      bundle.update_app_version(app_version)?;
    }

    Ok(())
  }

  /// Package a bundle, update the index, prune old releases, publish
  ///
  /// Returns the path of the freshly written archive. Publish failures
  /// (commit/push) are soft: the index working copy is already written,
  /// and a no-op commit is the common benign case.
  pub fn package_bundle(&mut self, name: &str, destination: &Path, keep_last_releases: usize) -> DepotResult<PathBuf> {
    let bundle = self
      .bundles
      .get_mut(name)
      .ok_or_else(|| DepotError::UnknownBundle { name: name.to_string() })?;

    let archive_path = bundle.package(destination, self.archiver.as_ref(), self.resolver.as_ref())?;
    let entry = bundle.release_entry(&self.host, &self.owner, &self.repository, &self.branch)?;
    let file_name = bundle.package_file_name();

    let removed = self.index.apply_release(name, entry, keep_last_releases)?;
    self.index.write()?;

    for release in &removed {
      let stale = destination.join(release.archive_file_name());
      if stale.is_file() {
        fs::remove_file(&stale).with_context(|| format!("Failed to remove stale archive {}", stale.display()))?;
      }
    }

    if let Err(err) = self.publish(&file_name) {
      eprintln!("⚠️  Publish failed (index was written locally): {}", err);
    }

    Ok(archive_path)
  }

  fn publish(&self, file_name: &str) -> DepotResult<()> {
    self.vcs.stage_all(&self.workdir)?;
    self.vcs.commit(&self.workdir, &format!("Add {}", file_name))?;
    self.vcs.push(&self.workdir, &self.branch)?;
    Ok(())
  }
}

/// Register a bundle for every immediate sub-directory that carries a
/// manifest; anything else is silently skipped
fn discover_bundles(root: &Path) -> DepotResult<BTreeMap<String, Bundle>> {
  let mut bundles = BTreeMap::new();

  let dir = fs::read_dir(root).with_context(|| format!("Failed to read bundles root {}", root.display()))?;
  for dir_entry in dir {
    let path = dir_entry
      .with_context(|| format!("Failed to read bundles root {}", root.display()))?
      .path();
    if !path.join(MANIFEST_FILE).is_file() {
      continue;
    }
    let bundle = Bundle::load(&path)?;
    bundles.insert(bundle.name().to_string(), bundle);
  }

  Ok(bundles)
}
