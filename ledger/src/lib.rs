//! Ledger access on top of the abstract stores.
//!
//! [`Ledger`] appends blocks: it checks chain linkage and checkpoints, stores
//! transactions, and assigns every output its global index within its amount
//! class. [`LedgerReader`] is the narrow, decoded, read-only view the depth
//! tracer consumes; [`StoreReader`] implements it for any store. The `spent`
//! module counts known spent outputs per amount class.

pub mod checkpoints;
pub mod error;
pub mod ledger;
pub mod reader;
pub mod spent;

pub use checkpoints::Checkpoints;
pub use error::{CheckpointError, LedgerError, ReaderError, SpentError};
pub use ledger::{Ledger, LedgerSummary};
pub use reader::{LedgerReader, StoreReader};
pub use spent::{
    analyze_spent, is_decomposed_amount, load_known_spent, parse_known_spent, scan_known_spent,
    AmountStatus, AmountUsage, SpentReport,
};
