//! Subcommand implementations.

use std::time::Instant;

use anyhow::{bail, Context};

use mindepth_bootstrap::{export, import};
use mindepth_ledger::{
    analyze_spent, load_known_spent, scan_known_spent, Checkpoints, Ledger, StoreReader,
};
use mindepth_store_lmdb::{check_integrity, LmdbEnvironment};
use mindepth_tracer::{
    start_transactions, DepthReport, DepthTracer, OwnerPolicy, StartPoint, TraceConfig,
};
use mindepth_utils::format_duration;

use crate::args::{AnalyzeSpentArgs, DepthArgs, ExportArgs, ImportArgs};
use crate::config::ToolConfig;

/// Tracer settings: the config file's `[trace]` table with flags on top.
pub fn trace_config(config: &ToolConfig, args: &DepthArgs) -> TraceConfig {
    let mut trace = config.trace.clone();
    trace.include_coinbase |= args.include_coinbase;
    trace.parallel |= args.parallel;
    if args.strict_owners {
        trace.owner_policy = OwnerPolicy::RejectAmbiguous;
    }
    if args.max_depth.is_some() {
        trace.max_depth = args.max_depth;
    }
    trace
}

pub fn start_point(args: &DepthArgs) -> StartPoint {
    match (args.txid, args.height) {
        (Some(txid), _) => StartPoint::Transaction(txid),
        (None, Some(height)) => StartPoint::Block(height),
        (None, None) => StartPoint::default(),
    }
}

fn open_read_only(config: &ToolConfig) -> anyhow::Result<LmdbEnvironment> {
    let dir = config.ledger_dir();
    let env = LmdbEnvironment::open_read_only(&dir)
        .with_context(|| format!("failed to open ledger at {}", dir.display()))?;
    let report = check_integrity(&env)?;
    if !report.is_healthy() {
        bail!(
            "ledger at {} failed its integrity check: {}",
            dir.display(),
            report.errors.join("; ")
        );
    }
    Ok(env)
}

pub fn run_depth(config: &ToolConfig, args: &DepthArgs) -> anyhow::Result<()> {
    let trace = trace_config(config, args);
    let start = start_point(args);
    let env = open_read_only(config)?;
    let reader = StoreReader::new(&env);

    let started = Instant::now();
    let txids = start_transactions(&reader, &start, trace.include_coinbase)?;
    tracing::info!(%start, count = txids.len(), network = config.network.as_str(), "tracing");

    let outcomes = DepthTracer::new(&reader, trace).trace_all(&txids)?;
    let report = DepthReport::new(&outcomes).context("no transactions were traced")?;
    println!("{report}");

    tracing::info!(elapsed = %format_duration(started.elapsed()), "depth run complete");
    Ok(())
}

pub fn run_export(config: &ToolConfig, args: &ExportArgs) -> anyhow::Result<()> {
    let env = open_read_only(config)?;
    let started = Instant::now();
    let summary = export(&env, &args.output_file, args.block_start, args.block_stop)
        .with_context(|| format!("export to {} failed", args.output_file.display()))?;
    tracing::info!(
        first = summary.first,
        last = summary.last,
        written = summary.written,
        elapsed = %format_duration(started.elapsed()),
        "export complete"
    );
    Ok(())
}

pub fn run_import(config: &ToolConfig, args: &ImportArgs) -> anyhow::Result<()> {
    let mut checkpoints = Checkpoints::new();
    if let Some(path) = args.checkpoints.as_ref().or(config.checkpoints.as_ref()) {
        let added = checkpoints
            .load_from_json(path)
            .with_context(|| format!("failed to load checkpoints from {}", path.display()))?;
        tracing::info!(added, path = %path.display(), "loaded checkpoints");
    }

    let dir = config.ledger_dir();
    let env = LmdbEnvironment::open(&dir, config.map_size)
        .with_context(|| format!("failed to open ledger at {}", dir.display()))?;
    let ledger = Ledger::with_checkpoints(env, checkpoints);

    let started = Instant::now();
    let summary = import(&ledger, &args.input_file)
        .with_context(|| format!("import of {} failed", args.input_file.display()))?;
    let height = ledger.height()?;
    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        height,
        elapsed = %format_duration(started.elapsed()),
        "import complete"
    );
    Ok(())
}

pub fn run_analyze_spent(config: &ToolConfig, args: &AnalyzeSpentArgs) -> anyhow::Result<()> {
    let env = open_read_only(config)?;
    let started = Instant::now();
    let known = match &args.input {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading known spent outputs");
            load_known_spent(path)?
        }
        None => scan_known_spent(&StoreReader::new(&env))?,
    };

    let report = analyze_spent(&env, &known)?;
    if args.verbose {
        for usage in &report.amounts {
            println!("{usage}");
        }
    }
    println!("{report}");

    tracing::info!(
        amounts = report.amounts.len(),
        elapsed = %format_duration(started.elapsed()),
        "spent analysis complete"
    );
    Ok(())
}
