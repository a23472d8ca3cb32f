//! System git backend - zero crate dependencies
//!
//! Shells out to the system `git` with an isolated environment so the
//! user's global configuration cannot change clone/push behavior.

use crate::core::error::{DepotError, DepotResult, GitError, ResultExt};
use crate::core::vcs::Vcs;
use std::path::Path;
use std::process::Command;

/// Git backend using system git
pub struct SystemGit;

impl SystemGit {
  /// Create a safe git command with isolated environment
  ///
  /// - Optionally sets the working directory with `-C`
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(workdir: Option<&Path>) -> Command {
    let mut cmd = Command::new("git");

    if let Some(dir) = workdir {
      cmd.arg("-C").arg(dir);
    }

    // Isolated environment (don't trust ambient variables)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");

    cmd
  }
}

impl Vcs for SystemGit {
  fn clone_branch(&self, remote: &str, branch: &str, dest: &Path) -> DepotResult<()> {
    let output = Self::git_cmd(None)
      .args(["clone", "-q", "-b", branch, "--depth", "1", remote])
      .arg(dest)
      .output()
      .context("Failed to execute git clone")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(DepotError::Git(GitError::CloneFailed {
        remote: remote.to_string(),
        branch: branch.to_string(),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }

  fn stage_all(&self, workdir: &Path) -> DepotResult<()> {
    let output = Self::git_cmd(Some(workdir))
      .args(["add", "-A"])
      .output()
      .context("Failed to execute git add")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(DepotError::Git(GitError::CommandFailed {
        command: "git add -A".to_string(),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }

  fn commit(&self, workdir: &Path, message: &str) -> DepotResult<()> {
    let output = Self::git_cmd(Some(workdir))
      .args(["commit", "-m", message])
      .output()
      .context("Failed to execute git commit")?;

    if !output.status.success() {
      // "nothing to commit" lands here too; the caller decides whether
      // a failed publish is fatal
      let stderr = String::from_utf8_lossy(&output.stderr);
      let stdout = String::from_utf8_lossy(&output.stdout);
      return Err(DepotError::Git(GitError::CommandFailed {
        command: format!("git commit -m '{}'", message),
        stderr: format!("{}{}", stderr.trim(), stdout.trim()),
      }));
    }

    Ok(())
  }

  fn push(&self, workdir: &Path, branch: &str) -> DepotResult<()> {
    let output = Self::git_cmd(Some(workdir))
      .args(["push", "origin", branch])
      .output()
      .context("Failed to execute git push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(DepotError::Git(GitError::PushFailed {
        branch: branch.to_string(),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }
}
