pub mod event;
pub mod preview;
pub mod pull_request;
pub mod push;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use haltgate_core::Settings;
use haltgate_dispatch::EventContext;
use haltgate_git::GitCli;
use haltgate_github::GitHubClient;
use haltgate_notify::{NotificationSink, SlackWebhook};

/// Wires the production collaborators for one run.
pub(crate) fn event_context(settings: Settings, repo_dir: &Path) -> EventContext {
    let host = Arc::new(GitHubClient::from_settings(&settings));
    let history = Arc::new(GitCli::new(repo_dir));
    let sink = SlackWebhook::from_settings(&settings)
        .map(|hook| Arc::new(hook) as Arc<dyn NotificationSink>);
    EventContext::new(settings, host, history, sink)
}

/// Runs `future` to completion on a fresh multi-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
