//! haltgate: halt and unhalt merges with a sentinel file on trunk.
//!
//! # Usage
//!
//! ```text
//! haltgate push --before <sha> [--repo-dir <dir>] [--json]
//! haltgate pull-request <number> [--json]
//! haltgate event [--event-name <name>] [--event-path <file>] [--ref <ref>]
//! haltgate preview <file> [--json]
//! ```
//!
//! Settings come from flags, then environment variables, then the YAML file
//! named by `--config`.

mod commands;
mod output;
mod settings;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use commands::{
    event::EventArgs, preview::PreviewArgs, pull_request::PullRequestArgs, push::PushArgs,
};
use settings::SettingsArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "haltgate",
    version,
    about = "Gate merges on a halt file in the trunk branch",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "HALT_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile every open pull request after a push to trunk.
    Push(PushArgs),

    /// Reconcile a single pull request.
    PullRequest(PullRequestArgs),

    /// Route a GitHub Actions event to `push` or `pull-request`.
    Event(EventArgs),

    /// Decode a halt file and show how it will be presented.
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Push(args) => args.run(&cli.settings),
        Commands::PullRequest(args) => args.run(&cli.settings),
        Commands::Event(args) => args.run(&cli.settings),
        Commands::Preview(args) => args.run(),
    }
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
