//! `haltgate push`: reconcile after a push to trunk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use haltgate_core::Settings;
use haltgate_dispatch::{handle_push, PushOutcome};

use crate::output;
use crate::settings::SettingsArgs;

/// Arguments for `haltgate push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Trunk head before the push. Absent or all zeros means the branch
    /// was just created.
    #[arg(long)]
    pub before: Option<String>,

    /// Checkout of the pushed trunk.
    #[arg(long, default_value = ".")]
    pub repo_dir: PathBuf,

    /// Emit the dispatch report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PushArgs {
    pub fn run(self, settings: &SettingsArgs) -> Result<()> {
        let settings = settings.resolve()?;
        run_push(settings, &self.repo_dir, self.before.as_deref(), self.json)
    }
}

pub(crate) fn run_push(
    settings: Settings,
    repo_dir: &Path,
    before: Option<&str>,
    json: bool,
) -> Result<()> {
    let ctx = super::event_context(settings, repo_dir);
    let outcome = super::block_on(handle_push(&ctx, before))?
        .context("failed to reconcile trunk push")?;
    match outcome {
        PushOutcome::NoAction => output::print_no_action(ctx.settings(), json),
        PushOutcome::Dispatched(report) => output::print_report(&report, json),
    }
}
