//! Domain types for halt reconciliation.
//!
//! Everything here is created once per event and never persisted; the code
//! host owns the only durable state (commit statuses).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::message;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An `owner/name` repository slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRepository(s.to_string());
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

/// A pull request number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProposalNumber(pub u64);

impl fmt::Display for ProposalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ProposalNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

// ---------------------------------------------------------------------------
// Code-host entities
// ---------------------------------------------------------------------------

/// An open change proposal. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub number: ProposalNumber,
    pub head_sha: String,
    pub base_ref: String,
}

/// Change kind of one file in a proposal, as reported by the code host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    /// `path` replaced `previous_filename`.
    Renamed,
    /// Copies, mode changes and anything newer than this enum.
    #[serde(other)]
    Other,
}

/// One entry of a proposal's changed-file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    #[serde(rename = "filename")]
    pub path: String,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

impl ChangedFile {
    /// Status records for this entry. A rename counts as removing the old
    /// path and adding the new one.
    pub fn into_records(self) -> Vec<StatusRecord> {
        match self.status {
            FileStatus::Added => vec![StatusRecord::Added(self.path)],
            FileStatus::Removed => vec![StatusRecord::Removed(self.path)],
            FileStatus::Modified => vec![StatusRecord::Modified(self.path)],
            FileStatus::Renamed => {
                let mut records = Vec::with_capacity(2);
                if let Some(previous) = self.previous_filename {
                    records.push(StatusRecord::Removed(previous));
                }
                records.push(StatusRecord::Added(self.path));
                records
            }
            FileStatus::Other => vec![StatusRecord::Unrecognized],
        }
    }
}

// ---------------------------------------------------------------------------
// Change sets
// ---------------------------------------------------------------------------

/// One raw revision-history status record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRecord {
    Added(String),
    Removed(String),
    Modified(String),
    Unrecognized,
}

/// Insertion-ordered set of paths with O(1) membership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl PathSet {
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    /// Appends `path` unless already present. Returns whether it was added.
    pub(crate) fn insert(&mut self, path: String) -> bool {
        if self.index.contains(&path) {
            return false;
        }
        self.index.insert(path.clone());
        self.order.push(path);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Net file additions and removals over a revision range.
///
/// A path never appears in both sets. Only [`crate::changes::extract`]
/// builds non-empty change sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub(crate) additions: PathSet,
    pub(crate) removals: PathSet,
}

impl ChangeSet {
    pub fn additions(&self) -> &PathSet {
        &self.additions
    }

    pub fn removals(&self) -> &PathSet {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Messages and verdicts
// ---------------------------------------------------------------------------

/// Structured halt message decoded from sentinel file content.
///
/// `title` is never empty and holds no line break; `summary`, when present,
/// starts with a line break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaltMessage {
    pub(crate) title: String,
    pub(crate) summary: Option<String>,
}

impl HaltMessage {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

impl fmt::Display for HaltMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&message::render(self))
    }
}

/// Halt/unhalt decision for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Halt(HaltMessage),
    Unhalt,
}

impl Verdict {
    pub fn kind(&self) -> VerdictKind {
        match self {
            Verdict::Halt(_) => VerdictKind::Halt,
            Verdict::Unhalt => VerdictKind::Unhalt,
        }
    }
}

/// Payload-free discriminant of [`Verdict`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictKind {
    Halt,
    Unhalt,
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictKind::Halt => write!(f, "halt"),
            VerdictKind::Unhalt => write!(f, "unhalt"),
        }
    }
}

// ---------------------------------------------------------------------------
// Status updates
// ---------------------------------------------------------------------------

/// Description attached to the success status of an unhalted proposal.
pub const UNHALTED_DESCRIPTION: &str = "Merges are not halted";

/// Commit status state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Failure,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusState::Success => "success",
            StatusState::Failure => "failure",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A commit status to publish on a proposal's head commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub proposal: ProposalNumber,
    pub commit_sha: String,
    pub check_name: String,
    pub state: StatusState,
    /// At most 140 characters.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl StatusUpdate {
    /// Builds the status that applies `verdict` to `proposal`.
    ///
    /// Halts carry the target URL; unhalts never do.
    pub fn for_verdict(
        verdict: &Verdict,
        proposal: &Proposal,
        check_name: &str,
        target_url: Option<&str>,
    ) -> Self {
        let (state, description, target_url) = match verdict {
            Verdict::Halt(msg) => (
                StatusState::Failure,
                message::render_status_description(msg),
                target_url.map(str::to_owned),
            ),
            Verdict::Unhalt => (StatusState::Success, UNHALTED_DESCRIPTION.to_string(), None),
        };
        Self {
            proposal: proposal.number,
            commit_sha: proposal.head_sha.clone(),
            check_name: check_name.to_string(),
            state,
            description,
            target_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal() -> Proposal {
        Proposal {
            number: ProposalNumber(7),
            head_sha: "abc123".to_string(),
            base_ref: "main".to_string(),
        }
    }

    #[test]
    fn repo_slug_parses_owner_and_name() {
        let slug: RepoSlug = "acme/widgets".parse().expect("slug");
        assert_eq!(slug.owner, "acme");
        assert_eq!(slug.name, "widgets");
        assert_eq!(slug.to_string(), "acme/widgets");
    }

    #[test]
    fn repo_slug_rejects_malformed_input() {
        for bad in ["", "acme", "/widgets", "acme/", "a/b/c"] {
            assert!(
                matches!(bad.parse::<RepoSlug>(), Err(ConfigError::InvalidRepository(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn proposal_number_display() {
        assert_eq!(ProposalNumber(42).to_string(), "#42");
    }

    #[test]
    fn path_set_keeps_first_insertion_order() {
        let mut set = PathSet::default();
        assert!(set.insert("b".into()));
        assert!(set.insert("a".into()));
        assert!(!set.insert("b".into()));
        assert_eq!(set.as_slice(), ["b", "a"]);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }

    #[test]
    fn changed_file_status_deserializes_unknown_as_other() {
        let file: ChangedFile =
            serde_json::from_str(r#"{"filename":"x.rs","status":"copied"}"#).expect("json");
        assert_eq!(file.status, FileStatus::Other);
        assert_eq!(file.previous_filename, None);
        assert_eq!(file.into_records(), [StatusRecord::Unrecognized]);
    }

    #[test]
    fn renamed_file_expands_to_removal_and_addition() {
        let file: ChangedFile = serde_json::from_str(
            r#"{"filename":".github/HALT.off","status":"renamed","previous_filename":".github/HALT"}"#,
        )
        .expect("json");
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(
            file.into_records(),
            [
                StatusRecord::Removed(".github/HALT".into()),
                StatusRecord::Added(".github/HALT.off".into()),
            ]
        );
    }

    #[test]
    fn unhalt_status_is_success_without_target_url() {
        let update = StatusUpdate::for_verdict(
            &Verdict::Unhalt,
            &proposal(),
            "halt",
            Some("https://example.com/runbook"),
        );
        assert_eq!(update.state, StatusState::Success);
        assert_eq!(update.description, UNHALTED_DESCRIPTION);
        assert_eq!(update.target_url, None);
        assert_eq!(update.commit_sha, "abc123");
    }

    #[test]
    fn halt_status_is_failure_with_title_description() {
        let verdict = Verdict::Halt(message::decode("API outage\n\nDetails here"));
        let update = StatusUpdate::for_verdict(
            &verdict,
            &proposal(),
            "halt",
            Some("https://example.com/runbook"),
        );
        assert_eq!(update.state, StatusState::Failure);
        assert_eq!(update.description, "API outage");
        assert_eq!(update.target_url.as_deref(), Some("https://example.com/runbook"));
        assert_eq!(update.proposal, ProposalNumber(7));
    }
}
