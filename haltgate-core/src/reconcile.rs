//! Halt/unhalt decisions.
//!
//! Both entry points are pure: every verdict is recomputed from the current
//! change set and sentinel content, so replaying an event or processing
//! events out of order converges on the same statuses.

use crate::message;
use crate::types::{ChangeSet, Verdict};

/// Decides verdicts for one sentinel path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciler {
    sentinel_path: String,
}

impl Reconciler {
    pub fn new(sentinel_path: impl Into<String>) -> Self {
        Self {
            sentinel_path: sentinel_path.into(),
        }
    }

    pub fn sentinel_path(&self) -> &str {
        &self.sentinel_path
    }

    /// Whether a trunk change set adds the sentinel, i.e. whether the caller
    /// needs to read its content before calling [`Self::decide_for_trunk`].
    pub fn sentinel_added(&self, changes: &ChangeSet) -> bool {
        changes.additions().contains(&self.sentinel_path)
    }

    /// Verdict for a trunk push, or `None` when the push leaves the sentinel
    /// alone.
    ///
    /// `sentinel_content` is the file as of the pushed head; a missing file
    /// decodes like an empty one.
    pub fn decide_for_trunk(
        &self,
        changes: &ChangeSet,
        sentinel_content: Option<&str>,
    ) -> Option<Verdict> {
        let added = changes.additions().contains(&self.sentinel_path);
        let removed = changes.removals().contains(&self.sentinel_path);
        match (added, removed) {
            (true, false) => Some(Verdict::Halt(message::decode(
                sentinel_content.unwrap_or_default(),
            ))),
            (false, true) => Some(Verdict::Unhalt),
            _ => None,
        }
    }

    /// Verdict for a single proposal.
    ///
    /// With no sentinel on the reference branch the proposal is always
    /// unhalted. Otherwise it is halted unless it deletes the sentinel
    /// itself.
    pub fn decide_for_proposal(
        &self,
        trunk_sentinel_content: Option<&str>,
        proposal_changes: &ChangeSet,
    ) -> Verdict {
        let Some(content) = trunk_sentinel_content else {
            return Verdict::Unhalt;
        };
        if proposal_changes.removals().contains(&self.sentinel_path) {
            return Verdict::Unhalt;
        }
        Verdict::Halt(message::decode(content))
    }
}
