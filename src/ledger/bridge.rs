//! Status ledger bridge
//!
//! Finds a project's row by its "{id} - {name}" key and writes the job outcome
//! back into the identifier and status columns. Rows are never created or
//! deleted here, and writes are last-write-wins.

use log::{info, warn};
use std::sync::Arc;

use crate::error::RemoteError;
use crate::ledger::layout::LedgerLayout;
use crate::ledger::store::LedgerStore;
use crate::rename::RenameReport;

pub const STATUS_IN_PROGRESS: &str = "renaming";
pub const STATUS_ERROR: &str = "renamingError";

/// Separator between identifier and name in a composite project key
pub const KEY_SEPARATOR: &str = " - ";

/// What a job writes into the status columns
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerStatus<'a> {
    InProgress,
    Success(&'a RenameReport),
    Error(&'a str),
}

/// Identifier part of a composite `"{id} - {name}"` key, or the whole value
pub fn identifier_of(project_name: &str) -> &str {
    project_name
        .split_once(KEY_SEPARATOR)
        .map_or(project_name, |(id, _)| id)
        .trim()
}

pub struct LedgerBridge {
    store: Arc<dyn LedgerStore>,
    layout: LedgerLayout,
}

impl LedgerBridge {
    pub fn new(store: Arc<dyn LedgerStore>, layout: LedgerLayout) -> Self {
        Self { store, layout }
    }

    /// 1-based index of the first data row whose composite key or bare
    /// identifier equals `previous_name`
    pub async fn find_row(&self, previous_name: &str) -> Result<Option<u32>, RemoteError> {
        let rows = self.store.read_range(&self.layout.scan_range()).await?;
        let name_offset = self.layout.name_offset();

        for (i, row) in rows.iter().enumerate() {
            let Some(id) = row.first() else {
                continue;
            };
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            let name = row.get(name_offset).map_or("", |name| name.trim());
            let combined = format!("{}{}{}", id, KEY_SEPARATOR, name);

            if combined == previous_name || id == previous_name {
                return Ok(Some(self.layout.first_row + i as u32));
            }
        }

        warn!("Project not found in ledger: {}", previous_name);
        Ok(None)
    }

    pub async fn write_identifier(&self, row: u32, new_id: &str) -> Result<(), RemoteError> {
        self.store
            .write_range(&self.layout.id_cell(row), vec![vec![new_id.to_string()]])
            .await?;
        info!("Updated ledger identifier at row {} with: {}", row, new_id);
        Ok(())
    }

    pub async fn write_status(&self, row: u32, status: LedgerStatus<'_>) -> Result<(), RemoteError> {
        let (status_value, error_value) = match status {
            LedgerStatus::InProgress => (STATUS_IN_PROGRESS.to_string(), String::new()),
            LedgerStatus::Success(report) => (serde_json::to_string(report)?, String::new()),
            LedgerStatus::Error(message) => (STATUS_ERROR.to_string(), message.to_string()),
        };

        self.store
            .write_range(
                &self.layout.status_range(row),
                vec![vec![status_value, error_value]],
            )
            .await?;
        info!("Updated ledger status columns at row {}", row);
        Ok(())
    }

    pub async fn mark_renaming(&self, row: u32) -> Result<(), RemoteError> {
        self.write_status(row, LedgerStatus::InProgress).await
    }
}
