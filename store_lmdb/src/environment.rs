//! LMDB environment setup.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, RoTxn};

use crate::migration::Migrator;
use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Default memory-map size for a writable environment (16 GiB of address
/// space; LMDB only consumes what it writes).
pub const DEFAULT_MAP_SIZE: usize = 16 * 1024 * 1024 * 1024;

const MAX_DBS: u32 = 8;

pub(crate) const BLOCKS_DB: &str = "blocks";
pub(crate) const BLOCK_HEIGHTS_DB: &str = "block_heights";
pub(crate) const TRANSACTIONS_DB: &str = "transactions";
pub(crate) const OUTPUTS_DB: &str = "outputs";
pub(crate) const OUTPUT_COUNTS_DB: &str = "output_counts";
pub(crate) const META_DB: &str = "meta";

/// Every named database a complete environment holds.
pub const DATABASE_NAMES: &[&str] = &[
    BLOCKS_DB,
    BLOCK_HEIGHTS_DB,
    TRANSACTIONS_DB,
    OUTPUTS_DB,
    OUTPUT_COUNTS_DB,
    META_DB,
];

/// Wraps the LMDB environment and all database handles.
///
/// - `blocks`: block hash(32) → encoded block.
/// - `block_heights`: height_be(8) → block hash(32).
/// - `transactions`: tx hash(32) → encoded transaction.
/// - `outputs`: amount_be(8) ++ index_be(8) → bincode `OutputLocation`.
/// - `output_counts`: amount_be(8) → count_be(8).
/// - `meta`: string key → bytes.
pub struct LmdbEnvironment {
    pub(crate) env: Env,
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    pub(crate) block_heights_db: Database<Bytes, Bytes>,
    pub(crate) transactions_db: Database<Bytes, Bytes>,
    pub(crate) outputs_db: Database<Bytes, Bytes>,
    pub(crate) output_counts_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    path: PathBuf,
    read_only: bool,
}

impl LmdbEnvironment {
    /// Open or create a writable environment at `path`, creating any missing
    /// databases and bringing the schema up to date.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Io(e.to_string()))?;

        // SAFETY: the environment is opened once per process and the backing
        // files are not modified by anything outside LMDB while it is open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let blocks_db = env.create_database(&mut wtxn, Some(BLOCKS_DB))?;
        let block_heights_db = env.create_database(&mut wtxn, Some(BLOCK_HEIGHTS_DB))?;
        let transactions_db = env.create_database(&mut wtxn, Some(TRANSACTIONS_DB))?;
        let outputs_db = env.create_database(&mut wtxn, Some(OUTPUTS_DB))?;
        let output_counts_db = env.create_database(&mut wtxn, Some(OUTPUT_COUNTS_DB))?;
        let meta_db = env.create_database(&mut wtxn, Some(META_DB))?;
        wtxn.commit()?;

        let environment = Self {
            env,
            blocks_db,
            block_heights_db,
            transactions_db,
            outputs_db,
            output_counts_db,
            meta_db,
            path: path.to_path_buf(),
            read_only: false,
        };
        Migrator::run(&environment)?;

        tracing::info!(path = %path.display(), "opened LMDB environment");
        Ok(environment)
    }

    /// Open an existing environment read-only. Fails if the directory or any
    /// of the expected databases is missing.
    pub fn open_read_only(path: &Path) -> Result<Self, LmdbError> {
        if !path.is_dir() {
            return Err(LmdbError::Io(format!(
                "ledger directory {} does not exist",
                path.display()
            )));
        }

        let mut options = EnvOpenOptions::new();
        options.max_dbs(MAX_DBS);
        // SAFETY: READ_ONLY only restricts what this handle may do.
        unsafe {
            options.flags(EnvFlags::READ_ONLY);
        }
        // SAFETY: see `open`.
        let env = unsafe { options.open(path)? };

        let handles = {
            let rtxn = env.read_txn()?;
            let handles = [
                open_existing(&env, &rtxn, BLOCKS_DB)?,
                open_existing(&env, &rtxn, BLOCK_HEIGHTS_DB)?,
                open_existing(&env, &rtxn, TRANSACTIONS_DB)?,
                open_existing(&env, &rtxn, OUTPUTS_DB)?,
                open_existing(&env, &rtxn, OUTPUT_COUNTS_DB)?,
                open_existing(&env, &rtxn, META_DB)?,
            ];
            // Database handles opened in a read transaction only survive
            // if that transaction commits.
            rtxn.commit()?;
            handles
        };
        let [blocks_db, block_heights_db, transactions_db, outputs_db, output_counts_db, meta_db] =
            handles;

        let environment = Self {
            env,
            blocks_db,
            block_heights_db,
            transactions_db,
            outputs_db,
            output_counts_db,
            meta_db,
            path: path.to_path_buf(),
            read_only: true,
        };
        Migrator::check(&environment)?;

        tracing::info!(path = %path.display(), "opened LMDB environment read-only");
        Ok(environment)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Start a write transaction spanning several tables.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, LmdbError> {
        WriteBatch::new(self)
    }
}

/// heed keeps every opened environment in a process-wide registry, and a
/// second open of the same path with other flags fails while the entry
/// lives. Releasing the registry's handle here lets the environment close
/// once this last handle is gone.
impl Drop for LmdbEnvironment {
    fn drop(&mut self) {
        let _closing = self.env.clone().prepare_for_closing();
        tracing::debug!(path = %self.path.display(), "closing LMDB environment");
    }
}

fn open_existing(
    env: &Env,
    rtxn: &RoTxn<'_>,
    name: &'static str,
) -> Result<Database<Bytes, Bytes>, LmdbError> {
    env.open_database::<Bytes, Bytes>(rtxn, Some(name))?
        .ok_or(LmdbError::MissingDatabase(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_open_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = LmdbEnvironment::open_read_only(&missing).err().unwrap();
        assert!(matches!(err, LmdbError::Io(_)));
    }

    #[test]
    fn writable_then_read_only() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).unwrap();
            assert!(!env.is_read_only());
        }
        let env = LmdbEnvironment::open_read_only(dir.path()).unwrap();
        assert!(env.is_read_only());
        assert_eq!(env.path(), dir.path());
    }

    #[test]
    fn reopen_cycles_keep_data() {
        use mindepth_store::{BlockStore, TransactionStore};
        use mindepth_types::{BlockHash, TxHash};

        let dir = tempfile::tempdir().unwrap();
        let txid = TxHash::new([3; 32]);
        {
            let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).unwrap();
            env.put_transaction(&txid, b"tx").unwrap();
            env.put_block(0, &BlockHash::new([4; 32]), b"block").unwrap();
        }
        {
            let env = LmdbEnvironment::open_read_only(dir.path()).unwrap();
            assert_eq!(env.block_count().unwrap(), 1);
        }
        let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).unwrap();
        assert_eq!(env.get_transaction(&txid).unwrap(), b"tx");
        drop(env);
        let env = LmdbEnvironment::open_read_only(dir.path()).unwrap();
        assert!(env.exists(&txid).unwrap());
    }
}
