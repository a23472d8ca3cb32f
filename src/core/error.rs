//! Error types for bundle-depot with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and
//! provides contextual help messages to users.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for bundle-depot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (unknown bundle, bad manifest, invalid args)
  User = 1,
  /// System error (git, I/O, broken index)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for bundle-depot
#[derive(Debug)]
pub enum DepotError {
  /// Bundle manifest errors
  Manifest(ManifestError),

  /// Release index errors
  Index(IndexError),

  /// Git operation errors
  Git(GitError),

  /// Referenced bundle was not discovered at startup
  UnknownBundle { name: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl DepotError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    DepotError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    DepotError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      DepotError::Message { message, context, help } => DepotError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => DepotError::Message {
        message: other.to_string(),
        context: Some(ctx_str),
        help: other.help_message(),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      DepotError::Manifest(_) => ExitCode::User,
      DepotError::UnknownBundle { .. } => ExitCode::User,
      DepotError::Message { .. } => ExitCode::User,
      DepotError::Index(_) => ExitCode::System,
      DepotError::Git(_) => ExitCode::System,
      DepotError::Io(_) => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      DepotError::Manifest(e) => e.help_message(),
      DepotError::Index(e) => e.help_message(),
      DepotError::Git(e) => e.help_message(),
      DepotError::UnknownBundle { .. } => Some(
        "Bundles are the sub-directories of the bundles root that contain a Bundle.toml manifest.".to_string(),
      ),
      DepotError::Message { help, .. } => help.clone(),
      DepotError::Io(_) => None,
    }
  }
}

impl fmt::Display for DepotError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DepotError::Manifest(e) => write!(f, "{}", e),
      DepotError::Index(e) => write!(f, "{}", e),
      DepotError::Git(e) => write!(f, "{}", e),
      DepotError::UnknownBundle { name } => write!(f, "Bundle '{}' was not found in the bundles root", name),
      DepotError::Io(e) => write!(f, "I/O error: {}", e),
      DepotError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for DepotError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      DepotError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for DepotError {
  fn from(err: io::Error) -> Self {
    DepotError::Io(err)
  }
}

impl From<String> for DepotError {
  fn from(msg: String) -> Self {
    DepotError::message(msg)
  }
}

impl From<&str> for DepotError {
  fn from(msg: &str) -> Self {
    DepotError::message(msg)
  }
}

impl From<toml_edit::TomlError> for DepotError {
  fn from(err: toml_edit::TomlError) -> Self {
    DepotError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for DepotError {
  fn from(err: toml_edit::de::Error) -> Self {
    DepotError::message(format!("TOML deserialization error: {}", err))
  }
}

/// Bundle manifest errors
#[derive(Debug)]
pub enum ManifestError {
  /// Manifest file missing from the bundle directory
  NotFound { path: PathBuf },

  /// Manifest file is not valid TOML
  Parse { path: PathBuf, message: String },

  /// Manifest is missing a required key
  MissingField { path: PathBuf, field: String },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::MissingField { field, .. } => Some(format!(
        "Every bundle manifest must declare 'version', 'appVersion', and 'description'. Add a '{}' key.",
        field
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::NotFound { path } => {
        write!(f, "Bundle manifest not found at: {}", path.display())
      }
      ManifestError::Parse { path, message } => {
        write!(f, "Failed to parse bundle manifest {}: {}", path.display(), message)
      }
      ManifestError::MissingField { path, field } => {
        write!(f, "Bundle manifest {} is missing required key '{}'", path.display(), field)
      }
    }
  }
}

/// Release index errors
#[derive(Debug)]
pub enum IndexError {
  /// Index file missing after the clone
  NotFound { path: PathBuf },

  /// Index file is not a valid index document
  Parse { path: PathBuf, message: String },
}

impl IndexError {
  fn help_message(&self) -> Option<String> {
    match self {
      IndexError::NotFound { .. } => {
        Some("The index branch must contain an index.toml at its root. Initialize it with an empty [entries] table.".to_string())
      }
      IndexError::Parse { .. } => None,
    }
  }
}

impl fmt::Display for IndexError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IndexError::NotFound { path } => {
        write!(f, "Release index not found at: {}", path.display())
      }
      IndexError::Parse { path, message } => {
        write!(f, "Failed to parse release index {}: {}", path.display(), message)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Branch-scoped clone of the index repository failed
  CloneFailed {
    remote: String,
    branch: String,
    stderr: String,
  },

  /// Push failed
  PushFailed { branch: String, stderr: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CloneFailed { .. } => Some(
        "Check that the repository exists, that the branch holds the release index, and that your SSH key has access."
          .to_string(),
      ),
      GitError::PushFailed { stderr, .. } => {
        if stderr.contains("non-fast-forward") {
          Some("The remote index moved since this run cloned it. Re-run to pick up the latest index.".to_string())
        } else {
          None
        }
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::CloneFailed { remote, branch, stderr } => {
        write!(f, "Failed to clone branch '{}' from {}: {}", branch, remote, stderr)
      }
      GitError::PushFailed { branch, stderr } => {
        write!(f, "Push to branch '{}' failed: {}", branch, stderr)
      }
    }
  }
}

/// Result type alias for bundle-depot
pub type DepotResult<T> = Result<T, DepotError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> DepotResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> DepotResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<DepotError>,
{
  fn context(self, ctx: impl Into<String>) -> DepotResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> DepotResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &DepotError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
