//! Packaging primitives: archive creation, digests, dependency resolution
//!
//! Each capability sits behind a small trait so the coordinator can be
//! exercised with fakes.

pub mod archive;
pub mod digest;
pub mod resolve;

pub use archive::{Archiver, TarGzArchiver};
pub use digest::sha256_file;
pub use resolve::{CommandResolver, DependencyResolver};
