//! Nullable infrastructure for deterministic testing.
//!
//! Storage is abstracted behind the `mindepth-store` traits. This crate
//! provides a test-friendly implementation that:
//! - Never touches the filesystem
//! - Can be inspected and manipulated programmatically
//! - Accepts raw records, so tests can build deliberately broken ledgers
//!
//! Usage: swap the LMDB environment for a [`NullStore`] in tests.

pub mod store;

pub use store::NullStore;
