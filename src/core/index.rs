//! The release index document and its retention rules
//!
//! The index lives at the root of the index branch as `index.toml`: an
//! `entries` table mapping bundle name to an array of release tables,
//! most recent first. Retained entries are moved into the rebuilt array
//! verbatim, so formatting and unrecognized keys survive every update.

use crate::core::error::{DepotError, DepotResult, IndexError, ResultExt};
use crate::core::manifest::ARCHIVE_EXT;
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml_edit::{Array, ArrayOfTables, DocumentMut, Item, Table};

/// Index file expected at the root of the index branch
pub const INDEX_FILE: &str = "index.toml";

/// Schema tag stamped on every release entry
pub const ENTRY_API_VERSION: &str = "v2";

/// Type tag stamped on every release entry
pub const ENTRY_TYPE: &str = "application";

/// One release of one bundle, immutable once written to the index
#[derive(Debug, Clone)]
pub struct ReleaseEntry {
  pub name: String,
  pub version: String,
  pub app_version: String,
  pub description: String,
  pub digest: String,
  pub created: String,
  pub urls: Vec<String>,
}

impl ReleaseEntry {
  /// Build an entry stamped with the current UTC time
  pub fn new(
    name: String,
    version: String,
    app_version: String,
    description: String,
    digest: String,
    url: String,
  ) -> Self {
    Self {
      name,
      version,
      app_version,
      description,
      digest,
      created: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
      urls: vec![url],
    }
  }

  fn to_table(&self) -> Table {
    let mut table = Table::new();
    table["apiVersion"] = toml_edit::value(ENTRY_API_VERSION);
    table["appVersion"] = toml_edit::value(self.app_version.as_str());
    table["created"] = toml_edit::value(self.created.as_str());
    table["description"] = toml_edit::value(self.description.as_str());
    table["digest"] = toml_edit::value(self.digest.as_str());
    table["name"] = toml_edit::value(self.name.as_str());
    table["type"] = toml_edit::value(ENTRY_TYPE);

    let mut urls = Array::new();
    for url in &self.urls {
      urls.push(url.as_str());
    }
    table["urls"] = toml_edit::value(urls);

    table["version"] = toml_edit::value(self.version.as_str());
    table
  }
}

/// A release pruned from the index; its archive should be deleted too
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedRelease {
  pub name: String,
  pub version: String,
}

impl RemovedRelease {
  /// Archive file name this release was published under
  pub fn archive_file_name(&self) -> String {
    format!("{}-{}.{}", self.name, self.version, ARCHIVE_EXT)
  }
}

/// The index document, edited in place
#[derive(Debug)]
pub struct Index {
  path: PathBuf,
  doc: DocumentMut,
}

impl Index {
  /// Load the index from disk
  pub fn load(path: &Path) -> DepotResult<Self> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        return Err(DepotError::Index(IndexError::NotFound { path: path.to_path_buf() }));
      }
      Err(err) => return Err(DepotError::Io(err)),
    };

    let doc: DocumentMut = content.parse().map_err(|err: toml_edit::TomlError| {
      DepotError::Index(IndexError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
      })
    })?;

    Ok(Self {
      path: path.to_path_buf(),
      doc,
    })
  }

  /// Write the full document back to disk
  pub fn write(&self) -> DepotResult<()> {
    fs::write(&self.path, self.doc.to_string()).with_context(|| format!("Failed to write {}", self.path.display()))
  }

  /// Versions currently listed for a bundle, most recent first
  pub fn versions(&self, bundle: &str) -> Vec<String> {
    self
      .doc
      .get("entries")
      .and_then(|item| item.as_table())
      .and_then(|entries| entries.get(bundle))
      .and_then(|item| item.as_array_of_tables())
      .map(|tables| {
        tables
          .iter()
          .filter_map(|t| t.get("version").and_then(|v| v.as_str()).map(str::to_string))
          .collect()
      })
      .unwrap_or_default()
  }

  /// Insert a new release for `bundle` and apply the retention cap
  ///
  /// The new entry becomes position 0. Existing entries are walked in
  /// their original order: any entry with the same version is superseded
  /// and dropped; the first `keep_last_releases - 1` remaining entries
  /// are retained verbatim; everything after that is pruned and returned
  /// so the caller can delete the matching archives.
  pub fn apply_release(
    &mut self,
    bundle: &str,
    entry: ReleaseEntry,
    keep_last_releases: usize,
  ) -> DepotResult<Vec<RemovedRelease>> {
    if !self.doc.contains_key("entries") {
      self.doc.insert("entries", Item::Table(Table::new()));
    }
    let entries = self
      .doc
      .get_mut("entries")
      .and_then(|item| item.as_table_mut())
      .ok_or_else(|| {
        DepotError::Index(IndexError::Parse {
          path: self.path.clone(),
          message: "'entries' is not a table".to_string(),
        })
      })?;

    let existing = match entries.get(bundle) {
      Some(Item::ArrayOfTables(tables)) => tables.clone(),
      Some(_) => {
        return Err(DepotError::Index(IndexError::Parse {
          path: self.path.clone(),
          message: format!("entries for '{}' are not an array of tables", bundle),
        }));
      }
      None => ArrayOfTables::new(),
    };

    let current_version = entry.version.clone();
    let mut kept = ArrayOfTables::new();
    kept.push(entry.to_table());

    let mut removed = Vec::new();
    let mut retained = 0usize;
    for previous in existing.iter() {
      let version = previous.get("version").and_then(|v| v.as_str()).unwrap_or_default();
      if version == current_version {
        // superseded by the entry we just inserted
        continue;
      }
      retained += 1;
      if retained < keep_last_releases {
        kept.push(previous.clone());
      } else {
        removed.push(RemovedRelease {
          name: previous
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or(bundle)
            .to_string(),
          version: version.to_string(),
        });
      }
    }

    entries.insert(bundle, Item::ArrayOfTables(kept));
    Ok(removed)
  }
}
