//! Revision-history source for `haltgate-git`.
//!
//! [`changes_in_push`] turns a push's `before` commit into a net change set
//! by diffing `<before>..HEAD` in a local checkout. CI checkouts are usually
//! shallow, so when the base commit is missing the history is deepened in
//! fixed steps up to a bounded number of attempts. Running out of attempts
//! is not an error: the push is treated as changing nothing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use haltgate_core::ChangeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How far to deepen a shallow clone while looking for a push's base commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepenPolicy {
    /// Commits fetched per deepen step.
    pub depth: u32,
    /// Deepen steps before giving up.
    pub max_attempts: u32,
}

impl Default for DeepenPolicy {
    fn default() -> Self {
        Self {
            depth: 10,
            max_attempts: 100,
        }
    }
}

/// Errors from revision-history access.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("base revision {base} not found after {attempts} deepen attempt(s)")]
    HistoryNotFound { base: String, attempts: u32 },
}

/// Access to a repository's revision history.
pub trait RevisionHistory: Send + Sync {
    /// `--name-status --no-renames` listing for `range`, or `None` when the
    /// range cannot be resolved yet (for instance the base commit is outside
    /// a shallow clone).
    fn diff_status(&self, range: &str) -> Result<Option<String>, GitError>;

    /// Fetches `depth` more commits of `branch`.
    fn deepen(&self, branch: &str, depth: u32) -> Result<(), GitError>;

    /// Reads a file from the checked-out work tree. `None` if absent.
    fn read_worktree_file(&self, path: &str) -> Result<Option<String>, GitError>;
}

/// [`RevisionHistory`] backed by the `git` binary and a local checkout.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: "origin".to_string(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn git(&self, args: &[&str]) -> Result<std::process::Output, GitError> {
        Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(GitError::Spawn)
    }
}

impl RevisionHistory for GitCli {
    fn diff_status(&self, range: &str) -> Result<Option<String>, GitError> {
        let output = self.git(&["diff", "--name-status", "--no-renames", range])?;
        if !output.status.success() {
            debug!(
                range,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git diff could not resolve range",
            );
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    fn deepen(&self, branch: &str, depth: u32) -> Result<(), GitError> {
        let deepen = format!("--deepen={depth}");
        let args = ["fetch", deepen.as_str(), self.remote.as_str(), branch];
        let output = self.git(&args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn read_worktree_file(&self, path: &str) -> Result<Option<String>, GitError> {
        let full = self.repo_dir.join(path);
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(GitError::Io { path: full, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Net change set of a push to `branch` whose previous head was `base`.
///
/// A missing or all-zero `base` (branch creation) and an unresolvable base
/// both yield an empty change set. Only failures to run git at all are
/// returned as errors.
pub fn changes_in_push(
    history: &dyn RevisionHistory,
    base: Option<&str>,
    branch: &str,
    policy: &DeepenPolicy,
) -> Result<ChangeSet, GitError> {
    let Some(base) = base.map(str::trim).filter(|b| !is_null_revision(b)) else {
        warn!("unable to determine commit before push");
        return Ok(ChangeSet::default());
    };

    match diff_with_deepening(history, base, branch, policy) {
        Ok(output) => Ok(ChangeSet::from_name_status(&output)),
        Err(err @ GitError::HistoryNotFound { .. }) => {
            warn!(error = %err, "treating push as having no changes");
            Ok(ChangeSet::default())
        }
        Err(err) => Err(err),
    }
}

fn diff_with_deepening(
    history: &dyn RevisionHistory,
    base: &str,
    branch: &str,
    policy: &DeepenPolicy,
) -> Result<String, GitError> {
    let range = format!("{base}..HEAD");
    info!(range = %range, "using changed files in range");

    let mut attempts = 0;
    loop {
        if let Some(output) = history.diff_status(&range)? {
            return Ok(output);
        }
        if attempts >= policy.max_attempts {
            return Err(GitError::HistoryNotFound {
                base: base.to_string(),
                attempts,
            });
        }
        attempts += 1;
        info!(
            base,
            branch,
            depth = policy.depth,
            attempt = attempts,
            "commit not found, deepening history",
        );
        if let Err(err) = history.deepen(branch, policy.depth) {
            warn!(error = %err, "deepen failed");
        }
    }
}

fn is_null_revision(rev: &str) -> bool {
    rev.is_empty() || rev.chars().all(|c| c == '0')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
