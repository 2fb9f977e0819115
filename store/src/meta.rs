//! Bookkeeping values stored beside the ledger tables.

use crate::StoreError;

const SCHEMA_VERSION_KEY: &str = "schema_version";

pub trait MetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Layout version of the stored ledger; 0 when never written.
    fn get_schema_version(&self) -> Result<u32, StoreError> {
        let bytes = match self.get_meta(SCHEMA_VERSION_KEY) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(0),
            Err(e) => return Err(e),
        };
        let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
            StoreError::Serialization(format!("schema version is {} bytes, want 4", bytes.len()))
        })?;
        Ok(u32::from_le_bytes(raw))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_VERSION_KEY, &version.to_le_bytes())
    }
}
