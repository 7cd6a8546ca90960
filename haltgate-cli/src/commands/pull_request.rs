//! `haltgate pull-request`: reconcile one pull request.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use haltgate_core::{ProposalNumber, Settings};
use haltgate_dispatch::handle_pull_request;

use crate::output;
use crate::settings::SettingsArgs;

/// Arguments for `haltgate pull-request`.
#[derive(Args, Debug)]
pub struct PullRequestArgs {
    /// Pull request number.
    pub number: u64,

    /// Emit the dispatch report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PullRequestArgs {
    pub fn run(self, settings: &SettingsArgs) -> Result<()> {
        run_pull_request(settings.resolve()?, ProposalNumber(self.number), self.json)
    }
}

pub(crate) fn run_pull_request(settings: Settings, number: ProposalNumber, json: bool) -> Result<()> {
    // Pull request events never read the local checkout.
    let ctx = super::event_context(settings, Path::new("."));
    let report = super::block_on(handle_pull_request(&ctx, number))?
        .with_context(|| format!("failed to reconcile pull request {number}"))?;
    output::print_report(&report, json)
}
