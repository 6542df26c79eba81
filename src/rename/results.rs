//! Rename job request and result types

use serde::{Deserialize, Serialize};

/// The three names identifying one rename job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameJobRequest {
    pub previous_name: String,
    pub current_name: String,
    pub vendor_name: String,
}

impl RenameJobRequest {
    pub fn new(previous_name: &str, current_name: &str, vendor_name: &str) -> Self {
        Self {
            previous_name: previous_name.to_string(),
            current_name: current_name.to_string(),
            vendor_name: vendor_name.to_string(),
        }
    }
}

/// Counts produced by a tree walk; no-op renames are not counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkCounts {
    pub folders_renamed: u32,
    pub files_renamed: u32,
}

impl WalkCounts {
    pub fn total(&self) -> u32 {
        self.folders_renamed + self.files_renamed
    }
}

/// Final record of a rename job, returned to the caller and written to the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    pub folders_renamed: u32,
    pub files_renamed: u32,
    pub shortcuts_renamed: u32,
    pub total_renamed: u32,
    pub duration_seconds: f64,
}

impl RenameReport {
    /// `folders_renamed` already includes the project folder itself
    pub fn new(folders_renamed: u32, files_renamed: u32, shortcuts_renamed: u32, duration_seconds: f64) -> Self {
        Self {
            folders_renamed,
            files_renamed,
            shortcuts_renamed,
            total_renamed: folders_renamed + files_renamed + shortcuts_renamed,
            duration_seconds,
        }
    }
}
