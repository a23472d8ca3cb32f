//! CLI commands for bundle-depot
//!
//! The tool exposes a single command: update a bundle's manifest,
//! package it, refresh the release index, and publish the result.

pub mod publish;

pub use publish::{PublishArgs, run_publish};
