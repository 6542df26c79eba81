//! Name resolution
//!
//! Walks exactly two levels below the namespace root: vendor folder, then
//! project folder. Both lookups run before anything is renamed.

use log::info;
use std::sync::Arc;

use crate::error::{RemoteError, RenameError};
use crate::rename::Stage;
use crate::storage::{DirectoryClient, DirectoryEntry, EntryFilter};

pub struct NameLookup {
    client: Arc<dyn DirectoryClient>,
    root_id: String,
}

impl NameLookup {
    pub fn new(client: Arc<dyn DirectoryClient>, root_id: &str) -> Self {
        Self {
            client,
            root_id: root_id.to_string(),
        }
    }

    /// First folder under `parent_id` named exactly `name`
    pub async fn find_container_by_name(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<Option<DirectoryEntry>, RemoteError> {
        self.client
            .find_one_by_name(parent_id, name, EntryFilter::Containers)
            .await
    }

    /// Id of the vendor folder directly under the namespace root
    pub async fn resolve_vendor(&self, vendor_name: &str) -> Result<String, RenameError> {
        let vendor = self
            .find_container_by_name(&self.root_id, vendor_name)
            .await
            .map_err(|e| RenameError::remote(Stage::ResolveVendor, vendor_name, e))?
            .ok_or_else(|| RenameError::NotFound {
                stage: Stage::ResolveVendor,
                subject: vendor_name.to_string(),
            })?;

        info!("Found vendor folder \"{}\" ({})", vendor_name, vendor.id);
        Ok(vendor.id)
    }

    /// The project folder named `previous_name` inside the vendor folder
    pub async fn resolve_project(
        &self,
        vendor_id: &str,
        previous_name: &str,
    ) -> Result<DirectoryEntry, RenameError> {
        let project = self
            .find_container_by_name(vendor_id, previous_name)
            .await
            .map_err(|e| RenameError::remote(Stage::ResolveProject, previous_name, e))?
            .ok_or_else(|| RenameError::NotFound {
                stage: Stage::ResolveProject,
                subject: previous_name.to_string(),
            })?;

        info!("Found project folder \"{}\" ({})", previous_name, project.id);
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDirectory;

    fn fixture() -> (Arc<MemoryDirectory>, String) {
        let dir = Arc::new(MemoryDirectory::new("root"));
        let vendor = dir.add_container("root", "VendorX");
        dir.add_item(&vendor, "100 - OldCo");
        dir.add_container(&vendor, "100 - OldCo");
        (dir, vendor)
    }

    #[tokio::test]
    async fn test_resolve_vendor_and_project() {
        let (dir, vendor) = fixture();
        let lookup = NameLookup::new(dir.clone(), "root");

        let vendor_id = lookup.resolve_vendor("VendorX").await.unwrap();
        assert_eq!(vendor_id, vendor);

        let project = lookup.resolve_project(&vendor_id, "100 - OldCo").await.unwrap();
        assert!(project.is_container);
        assert_eq!(project.name, "100 - OldCo");
    }

    #[tokio::test]
    async fn test_missing_vendor_is_not_found() {
        let (dir, _) = fixture();
        let lookup = NameLookup::new(dir.clone(), "root");

        let err = lookup.resolve_vendor("Acme").await.unwrap_err();
        assert!(matches!(
            err,
            RenameError::NotFound {
                stage: Stage::ResolveVendor,
                ..
            }
        ));
        assert_eq!(dir.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_vendor_is_only_searched_at_root() {
        let (dir, vendor) = fixture();
        dir.add_container(&vendor, "Nested");
        let lookup = NameLookup::new(dir, "root");

        assert!(lookup.resolve_vendor("Nested").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_project_is_not_found() {
        let (dir, vendor) = fixture();
        let lookup = NameLookup::new(dir, "root");

        let err = lookup.resolve_project(&vendor, "200 - Other").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::ResolveProject));
    }
}
