//! Fan-out of one verdict across proposals.
//!
//! Every proposal gets its own task. Tasks run concurrently up to
//! `max_concurrency`, each blocking code-host call is bounded by `timeout`,
//! and every task's outcome is collected, including panics and timeouts.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use haltgate_core::{Proposal, ProposalNumber, RepoSlug, Settings, StatusUpdate, Verdict};
use haltgate_github::CodeHost;
use haltgate_notify::{render_notification, NotificationContext, NotificationSink};

use crate::panic::describe_join_error;
use crate::report::{DispatchReport, ProposalOutcome};

/// Dispatcher knobs taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub repo: RepoSlug,
    pub check_name: String,
    pub target_url: Option<String>,
    /// Upper bound for each collaborator call.
    pub timeout: Duration,
    pub max_concurrency: usize,
}

impl DispatchSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            repo: settings.repository.clone(),
            check_name: settings.status_check_name.clone(),
            target_url: settings.status_target_url.clone(),
            timeout: settings.request_timeout,
            max_concurrency: settings.max_concurrency,
        }
    }
}

/// Applies verdicts as commit statuses and announces trunk-wide changes.
#[derive(Clone)]
pub struct Dispatcher {
    host: Arc<dyn CodeHost>,
    sink: Option<Arc<dyn NotificationSink>>,
    settings: Arc<DispatchSettings>,
}

impl Dispatcher {
    pub fn new(
        host: Arc<dyn CodeHost>,
        sink: Option<Arc<dyn NotificationSink>>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            host,
            sink,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Applies `verdict` to every proposal, then notifies the sink.
    pub async fn apply_to_all_open(&self, verdict: &Verdict, proposals: Vec<Proposal>) -> DispatchReport {
        info!(verdict = %verdict.kind(), proposals = proposals.len(), "applying verdict to open pull requests");
        let outcomes = self.fan_out(verdict, proposals).await;
        let notified = self.notify(verdict, &outcomes).await;
        DispatchReport::new(verdict.kind(), outcomes, notified)
    }

    /// Applies `verdict` to a single proposal. Never notifies.
    pub async fn apply_to_one(&self, verdict: &Verdict, proposal: Proposal) -> DispatchReport {
        info!(verdict = %verdict.kind(), proposal = proposal.number.0, "applying verdict to pull request");
        let outcomes = self.fan_out(verdict, vec![proposal]).await;
        DispatchReport::new(verdict.kind(), outcomes, false)
    }

    async fn fan_out(&self, verdict: &Verdict, proposals: Vec<Proposal>) -> Vec<ProposalOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrency.max(1)));
        let mut pending: BTreeMap<ProposalNumber, String> = BTreeMap::new();
        let mut tasks = JoinSet::new();

        for proposal in &proposals {
            let update = StatusUpdate::for_verdict(
                verdict,
                proposal,
                &self.settings.check_name,
                self.settings.target_url.as_deref(),
            );
            pending.insert(update.proposal, update.commit_sha.clone());

            let host = self.host.clone();
            let semaphore = semaphore.clone();
            let timeout = self.settings.timeout;
            tasks.spawn(async move {
                let number = update.proposal;
                let sha = update.commit_sha.clone();
                let error = match semaphore.acquire_owned().await {
                    Ok(permit) => submit_status(host, update, permit, timeout).await.err(),
                    Err(_) => Some("dispatch semaphore closed".to_string()),
                };
                ProposalOutcome { number, sha, error }
            });
        }

        let mut outcomes = Vec::with_capacity(proposals.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.remove(&outcome.number);
                    log_outcome(&outcome);
                    outcomes.push(outcome);
                }
                Err(err) => error!(error = %describe_join_error(err), "status task failed"),
            }
        }

        // A task that died before reporting still owes an outcome.
        for (number, sha) in pending {
            let outcome = ProposalOutcome {
                number,
                sha,
                error: Some("status task ended without reporting".to_string()),
            };
            log_outcome(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Best-effort announcement. Returns whether it was delivered.
    async fn notify(&self, verdict: &Verdict, outcomes: &[ProposalOutcome]) -> bool {
        let Some(sink) = self.sink.clone() else {
            return false;
        };
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        let ctx = NotificationContext::new(verdict, &self.settings.repo, outcomes.len(), failed);
        let text = match render_notification(verdict, &ctx) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "failed to render notification");
                return false;
            }
        };

        let severity = verdict.kind();
        let task = tokio::task::spawn_blocking(move || sink.send(&text, severity));
        match tokio::time::timeout(self.settings.timeout, task).await {
            Ok(Ok(Ok(()))) => {
                info!("notification sent");
                true
            }
            Ok(Ok(Err(err))) => {
                warn!(error = %err, "failed to send notification");
                false
            }
            Ok(Err(err)) => {
                warn!(error = %describe_join_error(err), "notification task failed");
                false
            }
            Err(_) => {
                warn!(timeout_secs = self.settings.timeout.as_secs(), "notification timed out");
                false
            }
        }
    }
}

async fn submit_status(
    host: Arc<dyn CodeHost>,
    update: StatusUpdate,
    permit: OwnedSemaphorePermit,
    timeout: Duration,
) -> Result<(), String> {
    // The permit lives as long as the blocking call, which outlasts a timeout.
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        host.create_status(&update)
    });
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(err))) => Err(err.to_string()),
        Ok(Err(err)) => Err(describe_join_error(err)),
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs_f64())),
    }
}

fn log_outcome(outcome: &ProposalOutcome) {
    match &outcome.error {
        None => info!(proposal = outcome.number.0, sha = %outcome.sha, "status updated"),
        Some(err) => error!(
            proposal = outcome.number.0,
            sha = %outcome.sha,
            error = %err,
            "failed to update status",
        ),
    }
}
