//! Schema versioning for the ledger environment.
//!
//! The version lives under the `schema_version` meta key. A missing key
//! reads as 0, which is what a freshly created environment reports.

use mindepth_store::MetaStore;

use crate::LmdbError;

/// Layout version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// One upgrade step from `version` to `version + 1`.
type Step = fn() -> Result<(), LmdbError>;

/// Upgrade steps indexed by their source version.
const STEPS: [Step; CURRENT_SCHEMA_VERSION as usize] = [initial_layout];

/// 0 -> 1: nothing stored yet; the tables are created on open.
fn initial_layout() -> Result<(), LmdbError> {
    Ok(())
}

pub struct Migrator;

impl Migrator {
    /// Bring a writable environment up to [`CURRENT_SCHEMA_VERSION`].
    pub fn run(meta: &impl MetaStore) -> Result<(), LmdbError> {
        let found = Self::check(meta)?;
        if found == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = found, "ledger schema current");
            return Ok(());
        }

        for version in found..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "upgrading ledger schema");
            step(version)?;
        }
        meta.set_schema_version(CURRENT_SCHEMA_VERSION)
            .map_err(|e| LmdbError::Heed(e.to_string()))?;
        Ok(())
    }

    /// Stored version, refusing layouts newer than this build understands.
    /// Read-only environments stop here since they cannot be upgraded.
    pub fn check(meta: &impl MetaStore) -> Result<u32, LmdbError> {
        let found = meta
            .get_schema_version()
            .map_err(|e| LmdbError::Heed(e.to_string()))?;
        if found > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        Ok(found)
    }
}

fn step(from: u32) -> Result<(), LmdbError> {
    let run = STEPS
        .get(from as usize)
        .ok_or_else(|| LmdbError::Heed(format!("no schema upgrade from version {from}")))?;
    run()
}
