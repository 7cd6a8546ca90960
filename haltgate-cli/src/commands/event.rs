//! `haltgate event`: route a GitHub Actions event to the right handler.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use tracing::info;

use haltgate_core::{ProposalNumber, Settings};

use crate::settings::SettingsArgs;

/// Arguments for `haltgate event`.
#[derive(Args, Debug)]
pub struct EventArgs {
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: String,

    /// JSON webhook payload of the event.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// Ref that triggered the event; falls back to the payload's `ref`.
    #[arg(long = "ref", env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// Checkout used for push events.
    #[arg(long, default_value = ".")]
    pub repo_dir: PathBuf,

    /// Emit the dispatch report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// The parts of a webhook payload that matter for routing.
#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default, rename = "ref")]
    git_ref: Option<String>,
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Push { before: Option<String> },
    PullRequest(ProposalNumber),
    Ignore(String),
}

impl EventArgs {
    pub fn run(self, settings: &SettingsArgs) -> Result<()> {
        let settings = settings.resolve()?;
        let payload = load_payload(&self.event_path)?;
        match route(&self.event_name, self.git_ref.as_deref(), payload, &settings) {
            Route::Push { before } => {
                info!(event = %self.event_name, "handling trunk push");
                super::push::run_push(settings, &self.repo_dir, before.as_deref(), self.json)
            }
            Route::PullRequest(number) => {
                info!(event = %self.event_name, proposal = number.0, "handling pull request");
                super::pull_request::run_pull_request(settings, number, self.json)
            }
            Route::Ignore(reason) => {
                info!(event = %self.event_name, reason = %reason, "ignoring event");
                Ok(())
            }
        }
    }
}

fn load_payload(path: &Path) -> Result<EventPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event payload {}", path.display()))
}

fn route(
    event_name: &str,
    git_ref: Option<&str>,
    payload: EventPayload,
    settings: &Settings,
) -> Route {
    if event_name == "push" {
        let git_ref = git_ref.map(str::to_owned).or(payload.git_ref);
        return match git_ref {
            Some(r) if settings.is_trunk_ref(&r) => Route::Push {
                before: payload.before,
            },
            Some(r) => Route::Ignore(format!("push to {r} is not the trunk")),
            None => Route::Ignore("push event without a ref".to_string()),
        };
    }
    match payload.pull_request {
        Some(pr) => Route::PullRequest(ProposalNumber(pr.number)),
        None => Route::Ignore(format!("unsupported event {event_name}")),
    }
}
