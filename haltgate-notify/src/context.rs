//! Template context: serializable rendering payload built from a verdict.

use serde::Serialize;

use haltgate_core::{message, RepoSlug, Verdict};

use crate::error::NotifyError;

/// Flat rendering payload shared by the halt and unhalt templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContext {
    pub repo: String,
    pub title: Option<String>,
    /// Summary with surrounding blank lines trimmed.
    pub summary: Option<String>,
    /// Whether the halt message is the built-in default title.
    pub is_default: bool,
    /// Proposals the verdict was applied to.
    pub total: usize,
    /// Proposals whose status update failed.
    pub failed: usize,
    /// Proposals whose status update landed.
    pub applied: usize,
}

impl NotificationContext {
    pub fn new(verdict: &Verdict, repo: &RepoSlug, total: usize, failed: usize) -> Self {
        let (title, summary, is_default) = match verdict {
            Verdict::Halt(msg) => (
                Some(msg.title().to_string()),
                msg.summary()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned),
                message::is_default(msg),
            ),
            Verdict::Unhalt => (None, None, false),
        };
        Self {
            repo: repo.to_string(),
            title,
            summary,
            is_default,
            total,
            failed,
            applied: total.saturating_sub(failed),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, NotifyError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}
