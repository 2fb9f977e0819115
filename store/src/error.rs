use thiserror::Error;

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("undecodable stored value: {0}")]
    Serialization(String),

    #[error("inconsistent ledger tables: {0}")]
    Corruption(String),
}

impl StoreError {
    /// Lookups that miss are usually mapped to `None` by callers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
