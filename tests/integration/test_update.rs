//! Manifest update semantics driven through the CLI

use crate::helpers::TestDepot;
use anyhow::Result;

#[test]
fn test_no_update_flags_leave_manifest_byte_identical() -> Result<()> {
  let depot = TestDepot::new()?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;
  let before = depot.manifest("app")?;

  depot.run_ok(&["-c", "app"])?;

  assert_eq!(depot.manifest("app")?, before);
  Ok(())
}

#[test]
fn test_empty_version_values_are_ignored() -> Result<()> {
  let depot = TestDepot::new()?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;
  let before = depot.manifest("app")?;

  depot.run_ok(&["-c", "app", "-v", "", "-a", ""])?;

  assert_eq!(depot.manifest("app")?, before);
  Ok(())
}

#[test]
fn test_app_version_only() -> Result<()> {
  let depot = TestDepot::new()?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;

  depot.run_ok(&["-c", "app", "-a", "9.9.9"])?;

  let manifest = depot.manifest("app")?;
  assert!(manifest.contains("appVersion = \"9.9.9\""), "manifest: {manifest}");
  assert!(manifest.contains("version = \"1.0.0\""), "manifest: {manifest}");

  Ok(())
}

#[test]
fn test_both_versions_update_independently() -> Result<()> {
  let depot = TestDepot::new()?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;

  depot.run_ok(&["-c", "app", "-v", "1.2.0", "--app-version", "3.0.0"])?;

  let manifest = depot.manifest("app")?;
  assert!(manifest.contains("version = \"1.2.0\""), "manifest: {manifest}");
  assert!(manifest.contains("appVersion = \"3.0.0\""), "manifest: {manifest}");

  // Archive name follows the bumped release version
  let index = depot.remote_file("index.toml")?;
  assert!(index.contains("app-1.2.0.tgz"), "index: {index}");

  Ok(())
}

#[test]
fn test_versions_are_not_validated() -> Result<()> {
  let depot = TestDepot::new()?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;

  // Any non-empty string is accepted as a version
  depot.run_ok(&["-c", "app", "-v", "nightly-2026-08-07"])?;

  let manifest = depot.manifest("app")?;
  assert!(manifest.contains("version = \"nightly-2026-08-07\""), "manifest: {manifest}");

  Ok(())
}
