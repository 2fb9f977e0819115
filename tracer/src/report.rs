//! Human-readable depth report.

use std::fmt;

use mindepth_types::TxHash;

use crate::{summarize, DepthSummary, TraceOutcome};

/// Per-transaction depths followed by their mean and median.
#[derive(Clone, Debug)]
pub struct DepthReport {
    depths: Vec<(TxHash, u64)>,
    summary: DepthSummary,
}

impl DepthReport {
    /// Build a report from completed traces. Returns `None` for an empty set.
    pub fn new(outcomes: &[TraceOutcome]) -> Option<Self> {
        let depths: Vec<(TxHash, u64)> = outcomes.iter().map(|o| (o.txid, o.depth)).collect();
        let values: Vec<u64> = depths.iter().map(|(_, d)| *d).collect();
        let summary = summarize(&values)?;
        Some(Self { depths, summary })
    }

    pub fn depths(&self) -> &[(TxHash, u64)] {
        &self.depths
    }

    pub fn summary(&self) -> &DepthSummary {
        &self.summary
    }
}

impl fmt::Display for DepthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (txid, depth) in &self.depths {
            writeln!(f, "Min depth for txid {txid}: {depth}")?;
        }
        writeln!(
            f,
            "Average min depth for {} transaction(s): {}",
            self.summary.count, self.summary.mean
        )?;
        write!(
            f,
            "Median min depth for {} transaction(s): {}",
            self.summary.count, self.summary.median
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceStats;

    fn outcome(byte: u8, depth: u64) -> TraceOutcome {
        TraceOutcome {
            txid: TxHash::new([byte; 32]),
            depth,
            stats: TraceStats::default(),
        }
    }

    #[test]
    fn lines_in_order() {
        let report = DepthReport::new(&[outcome(0xab, 1), outcome(0x01, 4)]).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("Min depth for txid {}: 1", "ab".repeat(32)));
        assert_eq!(lines[1], format!("Min depth for txid {}: 4", "01".repeat(32)));
        assert_eq!(lines[2], "Average min depth for 2 transaction(s): 2.5");
        assert_eq!(lines[3], "Median min depth for 2 transaction(s): 2.5");
    }

    #[test]
    fn whole_numbers_print_without_fraction() {
        let report = DepthReport::new(&[outcome(1, 1), outcome(2, 2), outcome(3, 3)]).unwrap();
        assert!(report.to_string().ends_with("Median min depth for 3 transaction(s): 2"));
    }

    #[test]
    fn empty_set_has_no_report() {
        assert!(DepthReport::new(&[]).is_none());
    }
}
