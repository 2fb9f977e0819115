//! LMDB database integrity checks.
//!
//! Run after opening an environment to detect corruption early, before any
//! tool starts walking the ledger.

use crate::environment::DATABASE_NAMES;
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check that every expected database opens and can be counted, and that the
/// height index has no gaps.
///
/// Read failures are recorded in the report rather than causing a hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        databases_checked: 0,
        total_entries: 0,
        errors: Vec::new(),
    };

    let rtxn = env.env.read_txn()?;

    for &db_name in DATABASE_NAMES {
        match env
            .env
            .open_database::<heed::types::Bytes, heed::types::Bytes>(&rtxn, Some(db_name))
        {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{}': {}", db_name, e)),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{}' is missing", db_name)),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{}': {}", db_name, e)),
        }
    }

    // Heights are big-endian keys, so iteration order is height order and
    // the n-th key must be n.
    let mut expected: u64 = 0;
    for entry in env.block_heights_db.iter(&rtxn)? {
        let (key, _) = entry?;
        let height = match <[u8; 8]>::try_from(key) {
            Ok(bytes) => u64::from_be_bytes(bytes),
            Err(_) => {
                report.errors.push("malformed key in height index".to_string());
                break;
            }
        };
        if height != expected {
            report
                .errors
                .push(format!("height index gap: expected {}, found {}", expected, height));
            break;
        }
        expected += 1;
    }

    if report.is_healthy() {
        tracing::info!(
            databases = report.databases_checked,
            entries = report.total_entries,
            "integrity check passed"
        );
    } else {
        for error in &report.errors {
            tracing::warn!(%error, "integrity check");
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindepth_store::BlockStore;
    use mindepth_types::BlockHash;

    #[test]
    fn fresh_environment_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).unwrap();
        let report = check_integrity(&env).unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.databases_checked as usize, DATABASE_NAMES.len());
    }

    #[test]
    fn height_gap_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).unwrap();
        env.put_block(0, &BlockHash::new([1; 32]), b"a").unwrap();
        env.put_block(2, &BlockHash::new([2; 32]), b"b").unwrap();
        let report = check_integrity(&env).unwrap();
        assert!(!report.is_healthy());
    }
}
