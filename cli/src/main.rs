//! mindepth: minimum confirmation depth tracer and ledger bootstrap tool.

mod args;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;

use crate::args::{Cli, Command};
use crate::config::ToolConfig;

fn main() -> ExitCode {
    // Usage errors, including --help and --version, exit with status 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ToolConfig::resolve(&cli)?;
    mindepth_utils::init_logging(config.log_format, &config.log_level)?;
    tracing::debug!(?config, "resolved configuration");

    match &cli.command {
        Command::Depth(args) => commands::run_depth(&config, args),
        Command::Export(args) => commands::run_export(&config, args),
        Command::Import(args) => commands::run_import(&config, args),
        Command::AnalyzeSpent(args) => commands::run_analyze_spent(&config, args),
    }
}
