//! Storage directory client
//!
//! The capability the rename core needs from the remote hierarchical storage:
//! page through a container, find one child by exact name, rename an entry.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// One entry in the remote namespace. Identity is `id`; `name` is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
    pub is_container: bool,
}

/// Restricts a listing or lookup to one kind of entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    Any,
    Containers,
    Items,
}

impl EntryFilter {
    pub fn accepts(&self, entry: &DirectoryEntry) -> bool {
        match self {
            EntryFilter::Any => true,
            EntryFilter::Containers => entry.is_container,
            EntryFilter::Items => !entry.is_container,
        }
    }
}

/// One page of a container listing
#[derive(Debug, Clone, Default)]
pub struct EntryPage {
    pub entries: Vec<DirectoryEntry>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch one page of the children of `container_id`.
    async fn list_page(
        &self,
        container_id: &str,
        filter: EntryFilter,
        page_token: Option<&str>,
    ) -> Result<EntryPage, RemoteError>;

    /// First child of `container_id` whose name equals `name` exactly.
    async fn find_one_by_name(
        &self,
        container_id: &str,
        name: &str,
        filter: EntryFilter,
    ) -> Result<Option<DirectoryEntry>, RemoteError>;

    async fn rename(&self, id: &str, new_name: &str) -> Result<(), RemoteError>;
}

/// Lists every child of a container, following page tokens until exhausted
pub async fn list_all(
    client: &dyn DirectoryClient,
    container_id: &str,
    filter: EntryFilter,
) -> Result<Vec<DirectoryEntry>, RemoteError> {
    let mut entries = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = client
            .list_page(container_id, filter, page_token.as_deref())
            .await?;
        pages += 1;
        entries.extend(page.entries);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    debug!(
        "Listed container {} - {} entries over {} pages",
        container_id,
        entries.len(),
        pages
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDirectory;

    #[tokio::test]
    async fn test_list_all_follows_pagination() {
        let dir = MemoryDirectory::new("root").with_page_size(2);
        for i in 0..5 {
            dir.add_item("root", &format!("file-{}", i));
        }
        dir.add_container("root", "sub");

        let all = list_all(&dir, "root", EntryFilter::Any).await.unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].name, "file-0");
        assert_eq!(all[5].name, "sub");
        assert_eq!(dir.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_list_all_empty_container() {
        let dir = MemoryDirectory::new("root");
        let all = list_all(&dir, "root", EntryFilter::Any).await.unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_filter_accepts() {
        let folder = DirectoryEntry {
            id: "1".into(),
            name: "a".into(),
            is_container: true,
        };
        assert!(EntryFilter::Any.accepts(&folder));
        assert!(EntryFilter::Containers.accepts(&folder));
        assert!(!EntryFilter::Items.accepts(&folder));
    }
}
