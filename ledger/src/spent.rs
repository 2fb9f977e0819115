//! Known spent outputs per amount class.
//!
//! An amount class whose every indexed output is known to be spent carries
//! no more ring-member information, so it is reported as prunable. Zero
//! amounts and round denominations (`d * 10^n`) are never eligible.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use mindepth_store::{OutputStore, StoreError};
use mindepth_types::Input;

use crate::{LedgerReader, SpentError};

/// `d * 10^n` with `d` in `1..=9`.
pub fn is_decomposed_amount(amount: u64) -> bool {
    if amount == 0 {
        return false;
    }
    let mut rest = amount;
    while rest % 10 == 0 {
        rest /= 10;
    }
    rest < 10
}

/// Count keyed inputs per non-zero amount over every main-chain transaction.
///
/// Amounts that only appear as outputs are listed with a count of zero.
/// Outputs of a version 2 block-reward transaction are amount-hidden and
/// not counted.
pub fn scan_known_spent<R: LedgerReader>(reader: &R) -> Result<BTreeMap<u64, u64>, SpentError> {
    let height = reader.chain_height()?;
    tracing::info!(blocks = height, "scanning for known spent outputs");

    let mut spent: BTreeMap<u64, u64> = BTreeMap::new();
    for h in 0..height {
        let block = reader
            .get_block_by_height(h)?
            .ok_or(SpentError::MissingBlock(h))?;

        let mut txs = vec![block.reward_tx().clone()];
        for txid in block.tx_hashes() {
            txs.push(
                reader
                    .get_transaction(txid)?
                    .ok_or(SpentError::MissingTransaction(*txid))?,
            );
        }

        for tx in &txs {
            for input in tx.inputs() {
                if let Input::Keyed { amount, .. } = input {
                    if *amount != 0 {
                        *spent.entry(*amount).or_insert(0) += 1;
                    }
                }
            }
            if tx.is_reward() && tx.version() >= 2 {
                continue;
            }
            for output in tx.outputs().iter().filter(|o| o.amount != 0) {
                spent.entry(output.amount).or_insert(0);
            }
        }

        if h % 1000 == 0 && h > 0 {
            tracing::info!("scanned {h}/{height} blocks");
        }
    }
    Ok(spent)
}

/// Parse a known-spent listing.
///
/// `@<amount>` starts an amount section; each following `<offset>` line
/// adds one spent output and `<offset>*<count>` adds `count`. Malformed
/// lines are logged and skipped.
pub fn parse_known_spent(content: &str) -> BTreeMap<u64, u64> {
    let mut spent: BTreeMap<u64, u64> = BTreeMap::new();
    let mut current: Option<u64> = None;

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(amount) = line.strip_prefix('@') {
            match amount.parse() {
                Ok(amount) => current = Some(amount),
                Err(_) => tracing::warn!(line = number + 1, "bad amount header"),
            }
            continue;
        }
        let Some(amount) = current else {
            tracing::warn!(line = number + 1, "offset before any amount header");
            continue;
        };
        match parse_offsets(line) {
            Some(count) => *spent.entry(amount).or_insert(0) += count,
            None => tracing::warn!(line = number + 1, "bad offset line"),
        }
    }
    spent
}

/// Number of outputs named by an `<offset>` or `<offset>*<count>` line.
fn parse_offsets(line: &str) -> Option<u64> {
    match line.split_once('*') {
        Some((offset, count)) => {
            let offset: u64 = offset.trim().parse().ok()?;
            let count: u64 = count.trim().parse().ok()?;
            offset.checked_add(count).map(|_| count)
        }
        None => line.parse::<u64>().ok().map(|_| 1),
    }
}

pub fn load_known_spent(path: &Path) -> Result<BTreeMap<u64, u64>, SpentError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SpentError::Io(format!("{}: {e}", path.display())))?;
    Ok(parse_known_spent(&content))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountStatus {
    /// Zero or a round denomination.
    Ignored,
    /// Some indexed outputs are not known to be spent.
    Live,
    /// Every indexed output is known spent.
    Prunable,
    /// More spends are known than outputs are indexed.
    Inconsistent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountUsage {
    pub amount: u64,
    pub outputs: u64,
    pub known_spent: u64,
    pub status: AmountStatus,
}

impl fmt::Display for AmountUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}/{}", self.amount, self.known_spent, self.outputs)?;
        match self.status {
            AmountStatus::Ignored => write!(f, " (ignored)"),
            AmountStatus::Live => Ok(()),
            AmountStatus::Prunable => write!(f, " (prunable)"),
            AmountStatus::Inconsistent => write!(f, " (more spent than indexed)"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpentReport {
    pub amounts: Vec<AmountUsage>,
    pub total_outputs: u64,
    pub known_spent: u64,
    pub eligible_outputs: u64,
    pub eligible_known_spent: u64,
    pub prunable: u64,
}

impl fmt::Display for SpentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total outputs: {}", self.total_outputs)?;
        writeln!(f, "Known spent outputs: {}", self.known_spent)?;
        writeln!(f, "Eligible outputs: {}", self.eligible_outputs)?;
        writeln!(f, "Eligible known spent outputs: {}", self.eligible_known_spent)?;
        write!(f, "Prunable outputs: {}", self.prunable)
    }
}

/// Compare `known` spend counts with the output index of `store`.
pub fn analyze_spent<S: OutputStore>(
    store: &S,
    known: &BTreeMap<u64, u64>,
) -> Result<SpentReport, StoreError> {
    let mut report = SpentReport::default();

    for (&amount, &known_spent) in known {
        let outputs = store.output_count(amount)?;
        report.total_outputs += outputs;
        report.known_spent += known_spent;

        let status = if amount == 0 || is_decomposed_amount(amount) {
            AmountStatus::Ignored
        } else {
            report.eligible_outputs += outputs;
            report.eligible_known_spent += known_spent;
            if outputs > known_spent {
                AmountStatus::Live
            } else if outputs < known_spent {
                tracing::warn!(amount, outputs, known_spent, "more outputs spent than indexed");
                AmountStatus::Inconsistent
            } else {
                report.prunable += known_spent;
                AmountStatus::Prunable
            }
        };

        report.amounts.push(AmountUsage {
            amount,
            outputs,
            known_spent,
            status,
        });
    }
    Ok(report)
}
