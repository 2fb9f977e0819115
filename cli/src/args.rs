//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mindepth_types::TxHash;
use mindepth_utils::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "mindepth",
    version,
    about = "Minimum confirmation depth tracing and ledger bootstrap tools"
)]
pub struct Cli {
    /// Data directory holding the ledger. Testnet and stagenet ledgers live
    /// in a sub-directory named after the network.
    #[arg(long, global = true, env = "MINDEPTH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use the testnet ledger.
    #[arg(long, global = true, conflicts_with = "stagenet")]
    pub testnet: bool,

    /// Use the stagenet ledger.
    #[arg(long, global = true)]
    pub stagenet: bool,

    /// Log filter, e.g. "info" or "debug,mindepth_tracer=trace".
    #[arg(long, global = true, env = "MINDEPTH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, global = true, env = "MINDEPTH_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// TOML configuration file. CLI flags and environment variables
    /// override its values.
    #[arg(long, global = true, env = "MINDEPTH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute minimum confirmation depths.
    Depth(DepthArgs),
    /// Export the main chain to a bootstrap file.
    Export(ExportArgs),
    /// Import a bootstrap file into the ledger.
    Import(ImportArgs),
    /// Report amount classes whose outputs are all known to be spent.
    AnalyzeSpent(AnalyzeSpentArgs),
}

#[derive(Debug, clap::Args)]
pub struct DepthArgs {
    /// Trace a single transaction.
    #[arg(long, conflicts_with = "height")]
    pub txid: Option<TxHash>,

    /// Trace every transaction in the block at this height (default 0).
    #[arg(long)]
    pub height: Option<u64>,

    /// Also trace the block-reward transaction of the selected block.
    #[arg(long)]
    pub include_coinbase: bool,

    /// Fail when two transactions in a block own the same output key.
    #[arg(long)]
    pub strict_owners: bool,

    /// Fail any trace deeper than this.
    #[arg(long, env = "MINDEPTH_MAX_DEPTH")]
    pub max_depth: Option<u64>,

    /// Trace transactions in parallel.
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Bootstrap file to create or extend.
    #[arg(long)]
    pub output_file: PathBuf,

    /// First height to export.
    #[arg(long, default_value_t = 0)]
    pub block_start: u64,

    /// Last height to export; 0 means the chain tip.
    #[arg(long, default_value_t = 0)]
    pub block_stop: u64,
}

#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    /// Bootstrap file to read.
    #[arg(long)]
    pub input_file: PathBuf,

    /// JSON checkpoint file checked against every imported block.
    #[arg(long, env = "MINDEPTH_CHECKPOINTS")]
    pub checkpoints: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct AnalyzeSpentArgs {
    /// Known spent outputs listing; scans the ledger when absent.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Print one line per amount class.
    #[arg(long, short)]
    pub verbose: bool,
}
