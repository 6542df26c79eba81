//! Recursive rename walker
//!
//! Renames the descendants of a container (never the container itself) whose
//! names contain the old fragment. Traversal is depth-first over an explicit
//! stack of container ids, capped at a configured number of containers.
//! Every listing is complete (all pages) before any child is renamed, and the
//! first failed remote call aborts the rest of the walk.

use log::debug;
use std::sync::Arc;

use crate::error::RenameError;
use crate::rename::item::rename_item;
use crate::rename::{Stage, WalkCounts};
use crate::storage::{DirectoryClient, EntryFilter, list_all};

pub const DEFAULT_MAX_CONTAINERS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkMode {
    Folders,
    Files,
    Both,
}

impl WalkMode {
    fn listing_filter(&self) -> EntryFilter {
        match self {
            WalkMode::Folders => EntryFilter::Containers,
            WalkMode::Files | WalkMode::Both => EntryFilter::Any,
        }
    }

    fn listing_stage(&self) -> Stage {
        match self {
            WalkMode::Files => Stage::RenameFiles,
            WalkMode::Folders | WalkMode::Both => Stage::RenameFolders,
        }
    }
}

pub struct TreeWalker {
    client: Arc<dyn DirectoryClient>,
    max_containers: usize,
}

impl TreeWalker {
    pub fn new(client: Arc<dyn DirectoryClient>, max_containers: usize) -> Self {
        Self {
            client,
            max_containers: max_containers.max(1),
        }
    }

    /// Renames matching descendant folders and files in one pass
    pub async fn rename_tree(
        &self,
        container_id: &str,
        previous_fragment: &str,
        current_fragment: &str,
    ) -> Result<WalkCounts, RenameError> {
        self.walk(container_id, previous_fragment, current_fragment, WalkMode::Both)
            .await
    }

    /// Renames matching descendant folders only
    pub async fn rename_folders(
        &self,
        container_id: &str,
        previous_fragment: &str,
        current_fragment: &str,
    ) -> Result<u32, RenameError> {
        let counts = self
            .walk(container_id, previous_fragment, current_fragment, WalkMode::Folders)
            .await?;
        Ok(counts.folders_renamed)
    }

    /// Renames matching descendant files only
    pub async fn rename_files(
        &self,
        container_id: &str,
        previous_fragment: &str,
        current_fragment: &str,
    ) -> Result<u32, RenameError> {
        let counts = self
            .walk(container_id, previous_fragment, current_fragment, WalkMode::Files)
            .await?;
        Ok(counts.files_renamed)
    }

    async fn walk(
        &self,
        root_id: &str,
        previous_fragment: &str,
        current_fragment: &str,
        mode: WalkMode,
    ) -> Result<WalkCounts, RenameError> {
        let client = self.client.as_ref();
        let mut counts = WalkCounts::default();
        let mut pending = vec![root_id.to_string()];
        let mut visited = 0usize;

        while let Some(container_id) = pending.pop() {
            visited += 1;
            if visited > self.max_containers {
                return Err(RenameError::TraversalLimitExceeded {
                    limit: self.max_containers,
                });
            }

            let children = list_all(client, &container_id, mode.listing_filter())
                .await
                .map_err(|e| RenameError::remote(mode.listing_stage(), &container_id, e))?;
            let (folders, files): (Vec<_>, Vec<_>) =
                children.into_iter().partition(|entry| entry.is_container);

            if mode != WalkMode::Folders {
                for file in &files {
                    let renamed = rename_item(client, file, previous_fragment, current_fragment)
                        .await
                        .map_err(|e| RenameError::remote(Stage::RenameFiles, &file.id, e))?;
                    if renamed {
                        counts.files_renamed += 1;
                    }
                }
            }

            if mode != WalkMode::Files {
                for folder in &folders {
                    let renamed = rename_item(client, folder, previous_fragment, current_fragment)
                        .await
                        .map_err(|e| RenameError::remote(Stage::RenameFolders, &folder.id, e))?;
                    if renamed {
                        counts.folders_renamed += 1;
                    }
                }
            }

            // Reversed so the first listed sibling is descended into first.
            pending.extend(folders.into_iter().rev().map(|folder| folder.id));
        }

        debug!(
            "Walked {} containers under {} ({:?}): {} folders, {} files renamed",
            visited, root_id, mode, counts.folders_renamed, counts.files_renamed
        );

        Ok(counts)
    }
}
