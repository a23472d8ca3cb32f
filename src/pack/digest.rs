//! Content digests for packaged archives

use crate::core::error::{DepotResult, ResultExt};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Compute the SHA-256 digest of a file as lowercase hex
///
/// Streams the file through the hasher instead of loading it whole.
pub fn sha256_file(path: &Path) -> DepotResult<String> {
  let mut file = fs::File::open(path).with_context(|| format!("Failed to open {} for hashing", path.display()))?;

  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher).with_context(|| format!("Failed to hash {}", path.display()))?;

  Ok(format!("{:x}", hasher.finalize()))
}
