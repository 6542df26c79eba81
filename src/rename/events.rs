//! Job stages and the events emitted as a job moves through them
//!
//! Observers see every stage transition but cannot influence the job.

use log::{info, warn};
use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    ResolveVendor,
    ResolveProject,
    MarkInProgress,
    RenameProject,
    RenameFolders,
    RenameFiles,
    SyncShortcuts,
    LocateLedgerRow,
    WriteIdentifier,
    WriteStatus,
    Notify,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::ResolveVendor => "resolve_vendor",
            Stage::ResolveProject => "resolve_project",
            Stage::MarkInProgress => "mark_in_progress",
            Stage::RenameProject => "rename_project",
            Stage::RenameFolders => "rename_folders",
            Stage::RenameFiles => "rename_files",
            Stage::SyncShortcuts => "sync_shortcuts",
            Stage::LocateLedgerRow => "locate_ledger_row",
            Stage::WriteIdentifier => "write_identifier",
            Stage::WriteStatus => "write_status",
            Stage::Notify => "notify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    Started { stage: Stage },
    Finished { stage: Stage, renamed: Option<u32> },
    Skipped { stage: Stage, reason: String },
    Failed { stage: Stage, error: String },
}

pub trait RenameObserver: Send + Sync {
    fn on_event(&self, event: &StageEvent);
}

/// Forwards stage events to the `log` facade
#[derive(Debug, Default)]
pub struct LogObserver;

impl RenameObserver for LogObserver {
    fn on_event(&self, event: &StageEvent) {
        match event {
            StageEvent::Started { stage } => info!("[{}] started", stage),
            StageEvent::Finished {
                stage,
                renamed: Some(count),
            } => info!("[{}] finished - {} renamed", stage, count),
            StageEvent::Finished {
                stage,
                renamed: None,
            } => info!("[{}] finished", stage),
            StageEvent::Skipped { stage, reason } => info!("[{}] skipped: {}", stage, reason),
            StageEvent::Failed { stage, error } => warn!("[{}] failed: {}", stage, error),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StageEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<StageEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stages that emitted `Started`, in order
    pub fn started_stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                StageEvent::Started { stage } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl RenameObserver for RecordingObserver {
    fn on_event(&self, event: &StageEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
