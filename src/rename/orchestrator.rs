//! Rename orchestrator
//!
//! Runs one rename job through its stages in a fixed order. Every stage
//! failure is fatal except shortcut synchronization, and nothing is retried.
//! Vendor and project resolution both happen before the first mutation.

use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::error::RenameError;
use crate::ledger::{LedgerBridge, LedgerStatus, identifier_of};
use crate::notify::{ChangeEvent, ChangeNotifier};
use crate::rename::events::{LogObserver, RenameObserver, Stage, StageEvent};
use crate::rename::item::rename_item;
use crate::rename::lookup::NameLookup;
use crate::rename::shortcut::{DEFAULT_SHORTCUT_CONTAINER, ShortcutSync};
use crate::rename::walker::{DEFAULT_MAX_CONTAINERS, TreeWalker};
use crate::rename::{RenameJobRequest, RenameReport};
use crate::storage::DirectoryClient;

/// Static settings for every job run by one orchestrator
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Namespace root holding vendor folders and the shortcut folder
    pub root_id: String,
    pub shortcut_container: String,
    pub max_containers: usize,
    pub mark_in_progress: bool,
}

impl RenameOptions {
    pub fn new(root_id: &str) -> Self {
        Self {
            root_id: root_id.to_string(),
            shortcut_container: DEFAULT_SHORTCUT_CONTAINER.to_string(),
            max_containers: DEFAULT_MAX_CONTAINERS,
            mark_in_progress: false,
        }
    }
}

pub struct RenameOrchestrator {
    directory: Arc<dyn DirectoryClient>,
    lookup: NameLookup,
    walker: TreeWalker,
    shortcuts: ShortcutSync,
    ledger: LedgerBridge,
    notifier: Arc<dyn ChangeNotifier>,
    observer: Arc<dyn RenameObserver>,
    options: RenameOptions,
}

impl RenameOrchestrator {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        ledger: LedgerBridge,
        notifier: Arc<dyn ChangeNotifier>,
        options: RenameOptions,
    ) -> Self {
        Self {
            lookup: NameLookup::new(directory.clone(), &options.root_id),
            walker: TreeWalker::new(directory.clone(), options.max_containers),
            shortcuts: ShortcutSync::new(directory.clone(), &options.shortcut_container),
            directory,
            ledger,
            notifier,
            observer: Arc::new(LogObserver),
            options,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RenameObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn emit(&self, event: StageEvent) {
        self.observer.on_event(&event);
    }

    fn started(&self, stage: Stage) {
        self.emit(StageEvent::Started { stage });
    }

    fn finished(&self, stage: Stage, renamed: Option<u32>) {
        self.emit(StageEvent::Finished { stage, renamed });
    }

    fn failed(&self, error: RenameError) -> RenameError {
        if let Some(stage) = error.stage() {
            self.emit(StageEvent::Failed {
                stage,
                error: error.to_string(),
            });
        }
        error
    }

    /// Runs the whole job; the first fatal stage error is returned
    pub async fn run(&self, request: &RenameJobRequest) -> Result<RenameReport, RenameError> {
        let started_at = Instant::now();
        let previous = request.previous_name.as_str();
        let current = request.current_name.as_str();

        info!(
            "Starting rename: {} -> {} in vendor \"{}\"",
            previous, current, request.vendor_name
        );

        self.started(Stage::Validate);
        validate(request).map_err(|e| self.failed(e))?;
        self.finished(Stage::Validate, None);

        self.started(Stage::ResolveVendor);
        let vendor_id = self
            .lookup
            .resolve_vendor(&request.vendor_name)
            .await
            .map_err(|e| self.failed(e))?;
        self.finished(Stage::ResolveVendor, None);

        self.started(Stage::ResolveProject);
        let project = self
            .lookup
            .resolve_project(&vendor_id, previous)
            .await
            .map_err(|e| self.failed(e))?;
        self.finished(Stage::ResolveProject, None);

        if self.options.mark_in_progress {
            self.mark_in_progress(previous).await;
        }

        self.started(Stage::RenameProject);
        let project_renamed = rename_item(self.directory.as_ref(), &project, previous, current)
            .await
            .map_err(|e| self.failed(RenameError::remote(Stage::RenameProject, &project.id, e)))?;
        let main_folder = u32::from(project_renamed);
        self.finished(Stage::RenameProject, Some(main_folder));

        self.started(Stage::RenameFolders);
        let folders = self
            .walker
            .rename_folders(&project.id, previous, current)
            .await
            .map_err(|e| self.failed(e))?;
        self.finished(Stage::RenameFolders, Some(folders));

        self.started(Stage::RenameFiles);
        let files = self
            .walker
            .rename_files(&project.id, previous, current)
            .await
            .map_err(|e| self.failed(e))?;
        self.finished(Stage::RenameFiles, Some(files));

        self.started(Stage::SyncShortcuts);
        let shortcuts = self
            .shortcuts
            .rename_shortcut(&self.options.root_id, previous, current)
            .await;
        self.finished(Stage::SyncShortcuts, Some(shortcuts));

        self.started(Stage::LocateLedgerRow);
        let row = self
            .ledger
            .find_row(previous)
            .await
            .map_err(|e| self.failed(RenameError::remote(Stage::LocateLedgerRow, previous, e)))?;
        let Some(row) = row else {
            let report = RenameReport::new(
                folders + main_folder,
                files,
                shortcuts,
                started_at.elapsed().as_secs_f64(),
            );
            return Err(self.failed(RenameError::LedgerRowNotFound {
                previous_name: previous.to_string(),
                report,
            }));
        };
        self.finished(Stage::LocateLedgerRow, None);

        self.started(Stage::WriteIdentifier);
        let new_id = identifier_of(current);
        self.ledger
            .write_identifier(row, new_id)
            .await
            .map_err(|e| self.failed(RenameError::remote(Stage::WriteIdentifier, new_id, e)))?;
        self.finished(Stage::WriteIdentifier, None);

        self.started(Stage::WriteStatus);
        let report = RenameReport::new(
            folders + main_folder,
            files,
            shortcuts,
            started_at.elapsed().as_secs_f64(),
        );
        self.ledger
            .write_status(row, LedgerStatus::Success(&report))
            .await
            .map_err(|e| {
                self.failed(RenameError::remote(Stage::WriteStatus, format!("row {}", row), e))
            })?;
        self.finished(Stage::WriteStatus, None);

        self.started(Stage::Notify);
        let event = ChangeEvent::new(previous, current, true);
        self.notifier
            .publish(&event)
            .await
            .map_err(|e| self.failed(RenameError::remote(Stage::Notify, previous, e)))?;
        self.finished(Stage::Notify, None);

        info!(
            "Rename completed: {} folders, {} files, {} shortcuts in {:.2}s",
            report.folders_renamed,
            report.files_renamed,
            report.shortcuts_renamed,
            report.duration_seconds
        );

        Ok(report)
    }

    async fn mark_in_progress(&self, previous: &str) {
        self.started(Stage::MarkInProgress);
        let outcome = match self.ledger.find_row(previous).await {
            Ok(Some(row)) => self.ledger.mark_renaming(row).await.map(|_| true),
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => self.finished(Stage::MarkInProgress, None),
            Ok(false) => self.emit(StageEvent::Skipped {
                stage: Stage::MarkInProgress,
                reason: "ledger row not found".into(),
            }),
            Err(e) => self.emit(StageEvent::Skipped {
                stage: Stage::MarkInProgress,
                reason: e.to_string(),
            }),
        }
    }

    /// Best-effort write of a failure into the ledger's error column.
    /// Secondary failures are logged and swallowed.
    pub async fn record_failure(&self, request: &RenameJobRequest, error: &RenameError) {
        if matches!(error, RenameError::LedgerRowNotFound { .. }) {
            return;
        }

        let mut row = None;
        // The identifier column may already hold the new id.
        for key in [&request.previous_name, &request.current_name] {
            if key.trim().is_empty() {
                continue;
            }
            match self.ledger.find_row(key).await {
                Ok(Some(found)) => {
                    row = Some(found);
                    break;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not look up ledger row for \"{}\": {}", key, e);
                    return;
                }
            }
        }

        let Some(row) = row else {
            return;
        };
        let message = error.to_string();
        if let Err(e) = self.ledger.write_status(row, LedgerStatus::Error(&message)).await {
            warn!("Could not record failure at ledger row {}: {}", row, e);
        }
    }
}

fn validate(request: &RenameJobRequest) -> Result<(), RenameError> {
    let fields = [
        ("previousName", &request.previous_name),
        ("currentName", &request.current_name),
        ("vendorName", &request.vendor_name),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(RenameError::InvalidRequest(format!("{} is required", field)));
        }
    }
    if request.previous_name == request.current_name {
        return Err(RenameError::InvalidRequest(
            "previousName and currentName cannot be the same".into(),
        ));
    }
    Ok(())
}
