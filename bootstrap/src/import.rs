//! Replay a bootstrap file into a ledger.

use std::path::Path;

use mindepth_ledger::Ledger;
use mindepth_store::LedgerStore;
use mindepth_types::{Block, Transaction};

use crate::{BootstrapError, BootstrapReader};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: u64,
}

/// Append every block of the file at `path` to `ledger`.
///
/// Blocks below the ledger's current height are skipped, so importing the
/// same file twice, or a file overlapping the ledger, is harmless. Every
/// appended block goes through the ledger's linkage and checkpoint checks.
pub fn import<S: LedgerStore>(
    ledger: &Ledger<S>,
    path: &Path,
) -> Result<ImportSummary, BootstrapError> {
    let reader = BootstrapReader::open(path)?;
    let mut summary = ImportSummary::default();
    let mut height = ledger.height()?;
    tracing::info!(path = %path.display(), height, "importing bootstrap file");

    for package in reader {
        let package = package?;
        let block = Block::from_record(package.block)?;
        if block.height() < height {
            summary.skipped += 1;
            continue;
        }
        let txs = package
            .txs
            .into_iter()
            .map(Transaction::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        ledger.append_block(&block, &txs)?;
        height += 1;
        summary.imported += 1;
        if block.height() % 100 == 0 {
            tracing::info!(height = block.height(), "imported block");
        }
    }

    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        "bootstrap import complete"
    );
    Ok(summary)
}
