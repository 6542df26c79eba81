//! Ledger store capability: read and overwrite A1 ranges of cell strings

use async_trait::async_trait;

use crate::error::RemoteError;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Rows of the range; trailing empty cells and rows may be omitted.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, RemoteError>;

    /// Overwrites the range starting at its top-left cell (last write wins).
    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), RemoteError>;
}
