//! Run report rendering: a table for humans, JSON for pipelines.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use haltgate_core::{Settings, VerdictKind};
use haltgate_dispatch::DispatchReport;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "pull request")]
    number: String,
    #[tabled(rename = "commit")]
    sha: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "error")]
    error: String,
}

pub fn print_report(report: &DispatchReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to serialize report")?
        );
        return Ok(());
    }

    let verdict = match report.verdict {
        VerdictKind::Halt => "HALT".red().bold(),
        VerdictKind::Unhalt => "UNHALT".green().bold(),
    };
    let failed = report.failed().len();
    println!(
        "{verdict} | {} pull request(s) | {} updated | {} failed",
        report.outcomes.len(),
        report.succeeded(),
        failed,
    );

    if !report.outcomes.is_empty() {
        let rows: Vec<OutcomeRow> = report
            .outcomes
            .iter()
            .map(|o| OutcomeRow {
                number: o.number.to_string(),
                sha: short_sha(&o.sha).to_string(),
                status: (if o.is_ok() { "✓ updated" } else { "✗ failed" }).to_string(),
                error: o.error.clone().unwrap_or_default(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if report.notified {
        println!("Notification sent.");
    }
    if failed > 0 {
        println!(
            "{}",
            format!("{failed} status update(s) failed; see errors above.").yellow()
        );
    }
    Ok(())
}

pub fn print_no_action(settings: &Settings, json: bool) -> Result<()> {
    if json {
        let payload = json!({ "verdict": null, "outcomes": [], "notified": false });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize report")?
        );
        return Ok(());
    }
    println!("No changes to {} on {}; nothing to do.", settings.sentinel_path, settings.trunk_branch);
    Ok(())
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sha_truncates_long_hashes_only() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }
}
