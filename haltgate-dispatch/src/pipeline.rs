//! Event pipeline: from an inbound event to applied statuses.
//!
//! | Event                 | Change source                 | Targets              |
//! |-----------------------|-------------------------------|----------------------|
//! | push to trunk         | `git diff <before>..HEAD`     | every open proposal  |
//! | pull request update   | code-host changed-file list   | that proposal only   |

use std::sync::Arc;

use tracing::info;

use haltgate_core::{ChangeSet, ProposalNumber, Reconciler, Settings};
use haltgate_git::{changes_in_push, DeepenPolicy, GitError, RevisionHistory};
use haltgate_github::{CodeHost, GitHubError};
use haltgate_notify::NotificationSink;

use crate::dispatcher::{DispatchSettings, Dispatcher};
use crate::error::{join_err, DispatchError};
use crate::report::DispatchReport;

/// Collaborators and settings shared by every event handler.
#[derive(Clone)]
pub struct EventContext {
    settings: Arc<Settings>,
    host: Arc<dyn CodeHost>,
    history: Arc<dyn RevisionHistory>,
    dispatcher: Dispatcher,
    policy: DeepenPolicy,
}

impl EventContext {
    pub fn new(
        settings: Settings,
        host: Arc<dyn CodeHost>,
        history: Arc<dyn RevisionHistory>,
        sink: Option<Arc<dyn NotificationSink>>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            host.clone(),
            sink,
            DispatchSettings::from_settings(&settings),
        );
        Self {
            settings: Arc::new(settings),
            host,
            history,
            dispatcher,
            policy: DeepenPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DeepenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.settings.sentinel_path.clone())
    }
}

/// What a trunk push led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The push neither added nor removed the sentinel.
    NoAction,
    Dispatched(DispatchReport),
}

/// Handles a push to trunk whose previous head was `before`.
pub async fn handle_push(
    ctx: &EventContext,
    before: Option<&str>,
) -> Result<PushOutcome, DispatchError> {
    let reconciler = ctx.reconciler();
    let history = ctx.history.clone();
    let branch = ctx.settings.trunk_branch.clone();
    let policy = ctx.policy;
    let before = before.map(str::to_owned);
    let scan = reconciler.clone();

    let (changes, content) = tokio::task::spawn_blocking(move || -> Result<_, GitError> {
        let changes = changes_in_push(history.as_ref(), before.as_deref(), &branch, &policy)?;
        let content = if scan.sentinel_added(&changes) {
            history.read_worktree_file(scan.sentinel_path())?
        } else {
            None
        };
        Ok((changes, content))
    })
    .await
    .map_err(|err| join_err("revision history", err))??;

    let Some(verdict) = reconciler.decide_for_trunk(&changes, content.as_deref()) else {
        info!(sentinel = reconciler.sentinel_path(), "no halt file changes detected");
        return Ok(PushOutcome::NoAction);
    };
    info!(verdict = %verdict.kind(), "halt file changed on trunk");

    let host = ctx.host.clone();
    let proposals = tokio::task::spawn_blocking(move || host.list_open_proposals())
        .await
        .map_err(|err| join_err("list pull requests", err))??;

    let report = ctx.dispatcher.apply_to_all_open(&verdict, proposals).await;
    Ok(PushOutcome::Dispatched(report))
}

/// Handles an opened or updated pull request.
pub async fn handle_pull_request(
    ctx: &EventContext,
    number: ProposalNumber,
) -> Result<DispatchReport, DispatchError> {
    let reconciler = ctx.reconciler();
    let host = ctx.host.clone();
    let settings = ctx.settings.clone();

    let (proposal, content, changes) =
        tokio::task::spawn_blocking(move || -> Result<_, GitHubError> {
            let proposal = host.get_proposal(number)?;
            let content =
                host.get_file_content(&settings.sentinel_path, settings.reference_branch())?;
            // Only a halted reference branch makes the escape hatch relevant.
            let changes = match content {
                Some(_) => ChangeSet::from_changed_files(host.list_changed_files(number)?),
                None => ChangeSet::default(),
            };
            Ok((proposal, content, changes))
        })
        .await
        .map_err(|err| join_err("pull request lookup", err))??;

    info!(
        proposal = number.0,
        reference = ctx.settings.reference_branch(),
        halted = content.is_some(),
        "evaluating pull request",
    );
    let verdict = reconciler.decide_for_proposal(content.as_deref(), &changes);
    Ok(ctx.dispatcher.apply_to_one(&verdict, proposal).await)
}
