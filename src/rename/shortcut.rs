//! Shortcut synchronizer
//!
//! Keeps the pointer entries in the well-known "active projects" folder in
//! step with a renamed project. Nothing here can fail the job: every problem
//! is logged and reported as zero renamed.

use log::{info, warn};
use std::sync::Arc;

use crate::error::RemoteError;
use crate::rename::item::rename_item;
use crate::storage::{DirectoryClient, EntryFilter};

pub const DEFAULT_SHORTCUT_CONTAINER: &str = "Projects Active";

pub struct ShortcutSync {
    client: Arc<dyn DirectoryClient>,
    container_name: String,
}

impl ShortcutSync {
    pub fn new(client: Arc<dyn DirectoryClient>, container_name: &str) -> Self {
        Self {
            client,
            container_name: container_name.to_string(),
        }
    }

    /// Renames the shortcut folder and the item inside it; returns how many changed
    pub async fn rename_shortcut(
        &self,
        root_id: &str,
        previous_fragment: &str,
        current_fragment: &str,
    ) -> u32 {
        match self
            .try_rename_shortcut(root_id, previous_fragment, current_fragment)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!("Error renaming shortcuts for \"{}\": {}", previous_fragment, e);
                0
            }
        }
    }

    async fn try_rename_shortcut(
        &self,
        root_id: &str,
        previous_fragment: &str,
        current_fragment: &str,
    ) -> Result<u32, RemoteError> {
        let client = self.client.as_ref();

        let Some(active) = client
            .find_one_by_name(root_id, &self.container_name, EntryFilter::Containers)
            .await?
        else {
            info!("{} folder not found, skipping shortcuts", self.container_name);
            return Ok(0);
        };

        let Some(shortcut_folder) = client
            .find_one_by_name(&active.id, previous_fragment, EntryFilter::Containers)
            .await?
        else {
            info!(
                "Shortcut folder \"{}\" not found in {}",
                previous_fragment, self.container_name
            );
            return Ok(0);
        };

        let mut count = 0;
        if rename_item(client, &shortcut_folder, previous_fragment, current_fragment).await? {
            count += 1;
        }

        // Inner pointer entry, any type.
        let inner = client
            .find_one_by_name(&shortcut_folder.id, previous_fragment, EntryFilter::Any)
            .await?;
        if let Some(inner) = inner {
            if rename_item(client, &inner, previous_fragment, current_fragment).await? {
                count += 1;
            }
        }

        Ok(count)
    }
}
