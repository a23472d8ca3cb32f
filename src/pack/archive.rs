//! Archive creation for bundle directories

use crate::core::error::{DepotResult, ResultExt};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::Path;

/// Creates a single-file archive from a directory's contents
pub trait Archiver {
  /// Archive the contents of `src_dir` (rooted at `./`) into `dest`
  fn create(&self, src_dir: &Path, dest: &Path) -> DepotResult<()>;
}

/// Gzip-compressed tarball archiver (`.tgz`)
pub struct TarGzArchiver;

impl Archiver for TarGzArchiver {
  fn create(&self, src_dir: &Path, dest: &Path) -> DepotResult<()> {
    let file = File::create(dest).with_context(|| format!("Failed to create archive at {}", dest.display()))?;

    let gz = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(gz);
    tar
      .append_dir_all(".", src_dir)
      .with_context(|| format!("Failed to archive {}", src_dir.display()))?;

    let gz = tar.into_inner().context("Failed to finalize tar stream")?;
    gz.finish().context("Failed to finish gzip stream")?;

    Ok(())
  }
}
