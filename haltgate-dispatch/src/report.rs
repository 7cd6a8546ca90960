//! Outcome of applying one verdict.

use serde::Serialize;

use haltgate_core::{ProposalNumber, VerdictKind};

/// Result of one status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalOutcome {
    pub number: ProposalNumber,
    pub sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProposalOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Every status update attempted for one verdict, sorted by proposal number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub verdict: VerdictKind,
    pub outcomes: Vec<ProposalOutcome>,
    /// Whether a notification was delivered.
    pub notified: bool,
}

impl DispatchReport {
    pub fn new(verdict: VerdictKind, mut outcomes: Vec<ProposalOutcome>, notified: bool) -> Self {
        outcomes.sort_by_key(|o| o.number);
        Self {
            verdict,
            outcomes,
            notified,
        }
    }

    pub fn failed(&self) -> Vec<&ProposalOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok()).collect()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }
}
