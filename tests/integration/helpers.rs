//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A depot workspace wired to a local bare git remote
///
/// The binary whitelists only PATH and HOME, so git identity comes from
/// a .gitconfig in an isolated HOME directory.
pub struct TestDepot {
  _root: TempDir,
  /// Working directory the binary runs in (contains `bundles/`)
  pub path: PathBuf,
  /// Bare repository serving the index branch
  pub remote: PathBuf,
  home: PathBuf,
}

impl TestDepot {
  /// Create a depot whose remote index starts empty
  pub fn new() -> Result<Self> {
    Self::with_index("[entries]\n")
  }

  /// Create a depot whose remote index branch is seeded with `index`
  pub fn with_index(index: &str) -> Result<Self> {
    let root = TempDir::new()?;

    let path = root.path().join("workspace");
    std::fs::create_dir_all(path.join("bundles"))?;

    let home = root.path().join("home");
    std::fs::create_dir_all(&home)?;
    std::fs::write(
      home.join(".gitconfig"),
      "[user]\n\tname = Depot Test\n\temail = depot@test.invalid\n",
    )?;

    // Seed the index branch in a scratch repo, then serve it bare
    let seed = root.path().join("seed");
    std::fs::create_dir_all(&seed)?;
    git(&seed, &home, &["init", "--initial-branch=gh-pages"])?;
    std::fs::write(seed.join("index.toml"), index)?;
    git(&seed, &home, &["add", "."])?;
    git(&seed, &home, &["commit", "-m", "Seed index"])?;

    let remote = root.path().join("remote.git");
    git(
      root.path(),
      &home,
      &["clone", "--bare", seed.to_str().unwrap(), remote.to_str().unwrap()],
    )?;

    Ok(Self {
      _root: root,
      path,
      remote,
      home,
    })
  }

  /// Add a bundle directory with a commented manifest and a payload file
  pub fn add_bundle(&self, name: &str, version: &str, app_version: &str) -> Result<PathBuf> {
    let dir = self.path.join("bundles").join(name);
    std::fs::create_dir_all(dir.join("files"))?;

    std::fs::write(
      dir.join("Bundle.toml"),
      format!(
        r#"# {name} release manifest
version = "{version}"
appVersion = "{app_version}"
description = "Test bundle {name}"

[annotations]
team = "platform"
"#
      ),
    )?;
    std::fs::write(dir.join("files").join("config.txt"), "key = value\n")?;

    Ok(dir)
  }

  /// Read a bundle's manifest from disk
  pub fn manifest(&self, name: &str) -> Result<String> {
    Ok(std::fs::read_to_string(
      self.path.join("bundles").join(name).join("Bundle.toml"),
    )?)
  }

  /// Run bundle-depot with owner/repository/remote filled in; does not
  /// assert success
  pub fn run(&self, extra: &[&str]) -> Result<Output> {
    let bin = env!("CARGO_BIN_EXE_bundle-depot");
    let remote = self.remote.to_str().context("remote path is not UTF-8")?.to_string();

    let mut args = vec!["-o", "acme", "-r", "deploy", "--remote", remote.as_str()];
    args.extend_from_slice(extra);

    Command::new(bin)
      .current_dir(&self.path)
      .env("HOME", &self.home)
      .args(&args)
      .output()
      .context("Failed to run bundle-depot")
  }

  /// Run bundle-depot, require success, and return the working directory
  /// it printed along with the full stdout
  pub fn run_ok(&self, extra: &[&str]) -> Result<(PathBuf, String)> {
    let output = self.run(extra)?;
    if !output.status.success() {
      anyhow::bail!(
        "bundle-depot failed\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
      );
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let workdir = stdout.lines().next().context("missing working directory line")?.trim();
    Ok((PathBuf::from(workdir), stdout))
  }

  /// Read a file from the tip of the remote's index branch
  pub fn remote_file(&self, file: &str) -> Result<String> {
    let output = git(&self.remote, &self.home, &["show", &format!("gh-pages:{}", file)])?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }

  /// One-line log of the remote's index branch, newest first
  pub fn remote_log(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &self.home, &["log", "--format=%s", "gh-pages"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }
}

/// Run git in a directory with an isolated HOME
pub fn git(cwd: &Path, home: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .env("HOME", home)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}
