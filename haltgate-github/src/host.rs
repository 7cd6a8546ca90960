//! The code-host seam.

use haltgate_core::{ChangedFile, Proposal, ProposalNumber, StatusUpdate};

use crate::error::GitHubError;

/// Operations the reconciler needs from a code host, bound to one
/// repository.
///
/// Implementations are blocking; async callers run them on the blocking
/// pool.
pub trait CodeHost: Send + Sync {
    /// Every open proposal, across all pages.
    fn list_open_proposals(&self) -> Result<Vec<Proposal>, GitHubError>;

    fn get_proposal(&self, number: ProposalNumber) -> Result<Proposal, GitHubError>;

    /// File content at `git_ref`. A missing file is `Ok(None)`, never an
    /// error; every other failure is.
    fn get_file_content(&self, path: &str, git_ref: &str) -> Result<Option<String>, GitHubError>;

    fn list_changed_files(&self, number: ProposalNumber) -> Result<Vec<ChangedFile>, GitHubError>;

    fn create_status(&self, update: &StatusUpdate) -> Result<(), GitHubError>;
}
