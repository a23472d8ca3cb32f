//! Format-preserving editor for bundle manifests
//!
//! A bundle is a directory with a `Bundle.toml` at its root. Edits go
//! through a `toml_edit` document so that comments, key order, and every
//! untargeted key survive a rewrite byte-for-byte.

use crate::core::error::{DepotError, DepotResult, ManifestError, ResultExt};
use crate::core::index::ReleaseEntry;
use crate::pack::{Archiver, DependencyResolver, sha256_file};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

/// Manifest file expected at the root of every bundle directory
pub const MANIFEST_FILE: &str = "Bundle.toml";

/// Extension of packaged bundle archives
pub const ARCHIVE_EXT: &str = "tgz";

/// A single bundle and its manifest document
///
/// The in-memory document is the source of truth between writes; the
/// cached version fields are re-derived from it on every load.
#[derive(Debug)]
pub struct Bundle {
  dir: PathBuf,
  manifest_path: PathBuf,
  name: String,
  doc: DocumentMut,
  version: String,
  app_version: String,
  digest: Option<String>,
}

impl Bundle {
  /// Load the manifest from `<dir>/Bundle.toml`
  pub fn load(dir: &Path) -> DepotResult<Self> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let name = dir
      .file_name()
      .and_then(|n| n.to_str())
      .map(str::to_string)
      .ok_or_else(|| DepotError::message(format!("Invalid bundle directory name: {}", dir.display())))?;

    let content = match fs::read_to_string(&manifest_path) {
      Ok(content) => content,
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        return Err(DepotError::Manifest(ManifestError::NotFound { path: manifest_path }));
      }
      Err(err) => return Err(DepotError::Io(err)),
    };

    let doc: DocumentMut = content.parse().map_err(|err: toml_edit::TomlError| {
      DepotError::Manifest(ManifestError::Parse {
        path: manifest_path.clone(),
        message: err.to_string(),
      })
    })?;

    let version = required_key(&doc, &manifest_path, "version")?;
    let app_version = required_key(&doc, &manifest_path, "appVersion")?;

    Ok(Self {
      dir: dir.to_path_buf(),
      manifest_path,
      name,
      doc,
      version,
      app_version,
      digest: None,
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn app_version(&self) -> &str {
    &self.app_version
  }

  /// Digest of the last archive built by `package`, if any
  pub fn digest(&self) -> Option<&str> {
    self.digest.as_deref()
  }

  /// Set the release version and rewrite the manifest in place
  pub fn update_version(&mut self, new_version: &str) -> DepotResult<()> {
    self.doc["version"] = toml_edit::value(new_version);
    self.write()?;
    self.version = new_version.to_string();
    Ok(())
  }

  /// Set the application version and rewrite the manifest in place
  pub fn update_app_version(&mut self, new_version: &str) -> DepotResult<()> {
    self.doc["appVersion"] = toml_edit::value(new_version);
    self.write()?;
    self.app_version = new_version.to_string();
    Ok(())
  }

  fn write(&self) -> DepotResult<()> {
    fs::write(&self.manifest_path, self.doc.to_string())
      .with_context(|| format!("Failed to write {}", self.manifest_path.display()))
  }

  /// Archive file name for the current in-memory version
  pub fn package_file_name(&self) -> String {
    format!("{}-{}.{}", self.name, self.version, ARCHIVE_EXT)
  }

  /// Package the bundle directory into `<destination>/<name>-<version>.tgz`
  ///
  /// Dependency resolution runs first and is best-effort: a failure is
  /// reported as a warning and packaging continues. The archive digest is
  /// cached for the release entry.
  pub fn package(
    &mut self,
    destination: &Path,
    archiver: &dyn Archiver,
    resolver: &dyn DependencyResolver,
  ) -> DepotResult<PathBuf> {
    if let Err(err) = resolver.resolve(&self.dir) {
      eprintln!("⚠️  Dependency resolution for '{}' failed: {}", self.name, err);
    }

    let archive_path = destination.join(self.package_file_name());
    archiver.create(&self.dir, &archive_path)?;
    self.digest = Some(sha256_file(&archive_path)?);

    Ok(archive_path)
  }

  /// Build the release entry for the archive produced by `package`
  ///
  /// Fails when called before `package`, since an entry without a digest
  /// would be useless to consumers.
  pub fn release_entry(&self, host: &str, owner: &str, repository: &str, branch: &str) -> DepotResult<ReleaseEntry> {
    let digest = self
      .digest
      .clone()
      .ok_or_else(|| DepotError::message(format!("Bundle '{}' has not been packaged yet", self.name)))?;

    let description = required_key(&self.doc, &self.manifest_path, "description")?;
    let url = format!(
      "https://{}/{}/{}/{}/{}",
      host,
      owner,
      repository,
      branch,
      self.package_file_name()
    );

    Ok(ReleaseEntry::new(
      self.name.clone(),
      self.version.clone(),
      self.app_version.clone(),
      description,
      digest,
      url,
    ))
  }
}

fn required_key(doc: &DocumentMut, path: &Path, key: &str) -> DepotResult<String> {
  doc
    .get(key)
    .and_then(|item| item.as_str())
    .map(str::to_string)
    .ok_or_else(|| {
      DepotError::Manifest(ManifestError::MissingField {
        path: path.to_path_buf(),
        field: key.to_string(),
      })
    })
}
