//! Minimum confirmation depth tracing.
//!
//! Starting from a transaction, the tracer walks backwards through the
//! outputs its inputs reference, one frontier of owning transactions per
//! step, until some traced transaction carries a terminal (block-reward)
//! input. The number of steps taken is the transaction's depth.
//!
//! The tracer only reads the ledger, through [`mindepth_ledger::LedgerReader`].

pub mod config;
pub mod error;
pub mod report;
pub mod selection;
pub mod stats;
pub mod tracer;

pub use config::{OwnerPolicy, TraceConfig};
pub use error::TraceError;
pub use report::DepthReport;
pub use selection::{start_transactions, StartPoint};
pub use stats::{mean, median, summarize, DepthSummary};
pub use tracer::{DepthTracer, TraceOutcome, TraceStats};
