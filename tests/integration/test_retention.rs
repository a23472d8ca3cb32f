//! Retention and supersede behavior of the published index

use crate::helpers::TestDepot;
use anyhow::Result;
use toml_edit::DocumentMut;

const SEEDED_INDEX: &str = r#"# depot release index
generated = "2025-01-01T00:00:00Z"

[entries]

[[entries.app]]
name = "app"
version = "1.0.0"
digest = "aaa"

[[entries.app]]
name = "app"
version = "0.9.0"
digest = "bbb"

[[entries.app]]
name = "app"
version = "0.8.0"
digest = "ccc"

# sibling bundle, must survive untouched
[[entries.other]]
name = "other"
version = "4.2.0"
digest = "ddd"
"#;

fn versions(index: &str, bundle: &str) -> Result<Vec<String>> {
  let doc: DocumentMut = index.parse()?;
  Ok(
    doc["entries"][bundle]
      .as_array_of_tables()
      .map(|tables| {
        tables
          .iter()
          .filter_map(|t| t.get("version").and_then(|v| v.as_str()).map(String::from))
          .collect()
      })
      .unwrap_or_default(),
  )
}

#[test]
fn test_retention_cap_prunes_oldest_entries() -> Result<()> {
  let depot = TestDepot::with_index(SEEDED_INDEX)?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;

  depot.run_ok(&["-c", "app", "-v", "1.1.0", "-l", "2"])?;

  let index = depot.remote_file("index.toml")?;
  assert_eq!(versions(&index, "app")?, vec!["1.1.0", "1.0.0"]);
  assert!(!index.contains("0.9.0"), "pruned entry still present: {index}");
  assert!(!index.contains("0.8.0"), "pruned entry still present: {index}");

  Ok(())
}

#[test]
fn test_unrelated_index_content_is_preserved() -> Result<()> {
  let depot = TestDepot::with_index(SEEDED_INDEX)?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;

  depot.run_ok(&["-c", "app", "-v", "1.1.0", "-l", "2"])?;

  let index = depot.remote_file("index.toml")?;
  assert!(index.contains("# depot release index"));
  assert!(index.contains("generated = \"2025-01-01T00:00:00Z\""));
  assert!(index.contains("# sibling bundle, must survive untouched"));
  assert_eq!(versions(&index, "other")?, vec!["4.2.0"]);

  Ok(())
}

#[test]
fn test_same_version_release_is_superseded() -> Result<()> {
  let depot = TestDepot::with_index(SEEDED_INDEX)?;
  depot.add_bundle("app", "1.0.0", "2.0.0")?;

  // No version bump: re-releases 1.0.0, which replaces the stale entry
  depot.run_ok(&["-c", "app"])?;

  let index = depot.remote_file("index.toml")?;
  assert_eq!(versions(&index, "app")?, vec!["1.0.0", "0.9.0", "0.8.0"]);

  // The refreshed entry carries a real digest, not the stale seed value
  assert!(!index.contains("digest = \"aaa\""), "stale entry survived: {index}");

  Ok(())
}

#[test]
fn test_first_release_of_new_bundle() -> Result<()> {
  let depot = TestDepot::with_index(SEEDED_INDEX)?;
  depot.add_bundle("fresh", "0.1.0", "1.0.0")?;

  depot.run_ok(&["-c", "fresh"])?;

  let index = depot.remote_file("index.toml")?;
  assert_eq!(versions(&index, "fresh")?, vec!["0.1.0"]);
  assert_eq!(versions(&index, "app")?, vec!["1.0.0", "0.9.0", "0.8.0"]);

  Ok(())
}
