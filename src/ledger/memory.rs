//! In-process ledger used for local runs and tests
//!
//! Reads mimic the spreadsheet API: trailing empty cells of a row and trailing
//! empty rows are dropped.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::RemoteError;
use crate::ledger::layout::{CellRange, column_index};
use crate::ledger::store::LedgerStore;

#[derive(Default)]
pub struct MemoryLedger {
    cells: Mutex<BTreeMap<(u32, u32), String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn cells(&self) -> MutexGuard<'_, BTreeMap<(u32, u32), String>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets one cell, e.g. `set("B", 3, "100")`
    pub fn set(&self, column: &str, row: u32, value: &str) {
        if let Some(col) = column_index(column) {
            self.cells().insert((row, col), value.to_string());
        }
    }

    pub fn get(&self, column: &str, row: u32) -> Option<String> {
        let col = column_index(column)?;
        self.cells().get(&(row, col)).cloned()
    }

    /// Makes every later write fail
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::Relaxed);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

fn parse(range: &str) -> Result<CellRange, RemoteError> {
    CellRange::parse(range).ok_or_else(|| RemoteError::Status {
        code: 400,
        body: format!("Unable to parse range: {}", range),
    })
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, RemoteError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let range = parse(range)?;
        let cells = self.cells();

        let last_row = match range.end_row {
            Some(row) => row,
            None => cells
                .keys()
                .filter(|(_, col)| *col >= range.start_col && *col <= range.end_col)
                .map(|(row, _)| *row)
                .max()
                .unwrap_or(0),
        };

        let mut rows: Vec<Vec<String>> = (range.start_row..=last_row)
            .map(|row| {
                let mut values: Vec<String> = (range.start_col..=range.end_col)
                    .map(|col| cells.get(&(row, col)).cloned().unwrap_or_default())
                    .collect();
                while values.last().is_some_and(String::is_empty) {
                    values.pop();
                }
                values
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        Ok(rows)
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(RemoteError::Injected(format!("write {}", range)));
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        let range = parse(range)?;
        let mut cells = self.cells();

        for (row_offset, values) in rows.into_iter().enumerate() {
            for (col_offset, value) in values.into_iter().enumerate() {
                let key = (
                    range.start_row + row_offset as u32,
                    range.start_col + col_offset as u32,
                );
                cells.insert(key, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_trims_like_sheets() {
        let ledger = MemoryLedger::new();
        ledger.set("B", 3, "100");
        ledger.set("C", 3, "OldCo");
        ledger.set("B", 5, "200");
        ledger.set("AC", 9, "unrelated");

        let rows = ledger.read_range("'Project Configurator'!B3:C").await.unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["100".to_string(), "OldCo".to_string()],
                vec![],
                vec!["200".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_write_range_overwrites_cells() {
        let ledger = MemoryLedger::new();
        ledger.set("AD", 4, "old error");
        ledger
            .write_range("Sheet!AC4:AD4", vec![vec!["ok".into(), String::new()]])
            .await
            .unwrap();
        assert_eq!(ledger.get("AC", 4).as_deref(), Some("ok"));
        assert_eq!(ledger.get("AD", 4).as_deref(), Some(""));
        assert_eq!(ledger.write_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_writes_leaves_cells_untouched() {
        let ledger = MemoryLedger::new();
        ledger.set("AC", 4, "before");
        ledger.fail_writes();
        assert!(
            ledger
                .write_range("Sheet!AC4", vec![vec!["after".into()]])
                .await
                .is_err()
        );
        assert_eq!(ledger.get("AC", 4).as_deref(), Some("before"));
        assert_eq!(ledger.write_count(), 0);
    }
}
