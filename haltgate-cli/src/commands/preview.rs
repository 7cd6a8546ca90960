//! `haltgate preview`: show how a sentinel file will be presented.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use haltgate_core::message;

/// Arguments for `haltgate preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Sentinel file to decode.
    pub file: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PreviewJson<'a> {
    title: &'a str,
    summary: Option<&'a str>,
    status_description: String,
    is_default: bool,
}

impl PreviewArgs {
    pub fn run(self) -> Result<()> {
        let content = std::fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        let msg = message::decode(&content);
        let description = message::render_status_description(&msg);

        if self.json {
            let payload = PreviewJson {
                title: msg.title(),
                summary: msg.summary(),
                status_description: description,
                is_default: message::is_default(&msg),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize preview")?
            );
            return Ok(());
        }

        println!("{} {}", "title:".bold(), msg.title());
        match msg.summary().map(str::trim).filter(|s| !s.is_empty()) {
            Some(summary) => println!("{}\n{summary}", "summary:".bold()),
            None => println!("{} (none)", "summary:".bold()),
        }
        println!(
            "{} {description} ({} chars)",
            "status description:".bold(),
            description.chars().count()
        );
        if message::is_default(&msg) {
            println!("{}", "note: this is the default halt message".bright_black());
        }
        Ok(())
    }
}
