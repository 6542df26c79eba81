//! In-process storage tree
//!
//! Used for local runs and tests. Children keep insertion order, listings are
//! paginated by offset tokens, and every mutating call is counted.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::RemoteError;
use crate::storage::client::{DirectoryClient, DirectoryEntry, EntryFilter, EntryPage};

const DEFAULT_PAGE_SIZE: usize = 100;

struct Node {
    entry: DirectoryEntry,
    children: Vec<String>,
}

#[derive(Default)]
struct MemoryTree {
    nodes: HashMap<String, Node>,
    next_id: u64,
    failing_renames: HashSet<String>,
    fail_everything: bool,
}

pub struct MemoryDirectory {
    page_size: usize,
    tree: Mutex<MemoryTree>,
    list_calls: AtomicUsize,
    mutations: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new(root_id: &str) -> Self {
        let mut tree = MemoryTree::default();
        tree.nodes.insert(
            root_id.to_string(),
            Node {
                entry: DirectoryEntry {
                    id: root_id.to_string(),
                    name: root_id.to_string(),
                    is_container: true,
                },
                children: Vec::new(),
            },
        );

        Self {
            page_size: DEFAULT_PAGE_SIZE,
            tree: Mutex::new(tree),
            list_calls: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn tree(&self) -> MutexGuard<'_, MemoryTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, parent_id: &str, name: &str, is_container: bool) -> String {
        let mut tree = self.tree();
        tree.next_id += 1;
        let id = format!("{}-{}", if is_container { "dir" } else { "file" }, tree.next_id);
        tree.nodes.insert(
            id.clone(),
            Node {
                entry: DirectoryEntry {
                    id: id.clone(),
                    name: name.to_string(),
                    is_container,
                },
                children: Vec::new(),
            },
        );
        if let Some(parent) = tree.nodes.get_mut(parent_id) {
            parent.children.push(id.clone());
        }
        id
    }

    /// Adds a folder under `parent_id` and returns its id
    pub fn add_container(&self, parent_id: &str, name: &str) -> String {
        self.insert(parent_id, name, true)
    }

    /// Adds a file under `parent_id` and returns its id
    pub fn add_item(&self, parent_id: &str, name: &str) -> String {
        self.insert(parent_id, name, false)
    }

    pub fn name_of(&self, id: &str) -> Option<String> {
        self.tree().nodes.get(id).map(|node| node.entry.name.clone())
    }

    /// Names of every descendant of `container_id`, depth-first
    pub fn descendant_names(&self, container_id: &str) -> Vec<String> {
        let tree = self.tree();
        let mut names = Vec::new();
        let mut stack = vec![container_id.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(node) = tree.nodes.get(&id) {
                for child in node.children.iter().rev() {
                    if let Some(child_node) = tree.nodes.get(child) {
                        names.push(child_node.entry.name.clone());
                    }
                    stack.push(child.clone());
                }
            }
        }
        names
    }

    /// Makes every later rename of `id` fail
    pub fn fail_rename(&self, id: &str) {
        self.tree().failing_renames.insert(id.to_string());
    }

    /// Makes every later call fail
    pub fn fail_everything(&self) {
        self.tree().fail_everything = true;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    /// Number of rename calls that reached the store
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DirectoryClient for MemoryDirectory {
    async fn list_page(
        &self,
        container_id: &str,
        filter: EntryFilter,
        page_token: Option<&str>,
    ) -> Result<EntryPage, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let tree = self.tree();
        if tree.fail_everything {
            return Err(RemoteError::Injected(format!("list {}", container_id)));
        }

        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| RemoteError::Decode(format!("bad page token {}", token)))?,
            None => 0,
        };

        let node = tree.nodes.get(container_id).ok_or_else(|| RemoteError::Status {
            code: 404,
            body: format!("container {} not found", container_id),
        })?;

        let matching: Vec<DirectoryEntry> = node
            .children
            .iter()
            .filter_map(|id| tree.nodes.get(id))
            .map(|child| child.entry.clone())
            .filter(|entry| filter.accepts(entry))
            .collect();

        let end = offset.saturating_add(self.page_size).min(matching.len());
        let entries = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(EntryPage {
            entries,
            next_page_token,
        })
    }

    async fn find_one_by_name(
        &self,
        container_id: &str,
        name: &str,
        filter: EntryFilter,
    ) -> Result<Option<DirectoryEntry>, RemoteError> {
        let tree = self.tree();
        if tree.fail_everything {
            return Err(RemoteError::Injected(format!("find {} in {}", name, container_id)));
        }

        let found = tree.nodes.get(container_id).and_then(|node| {
            node.children
                .iter()
                .filter_map(|id| tree.nodes.get(id))
                .map(|child| &child.entry)
                .find(|entry| entry.name == name && filter.accepts(entry))
                .cloned()
        });

        Ok(found)
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<(), RemoteError> {
        let mut tree = self.tree();
        if tree.fail_everything || tree.failing_renames.contains(id) {
            return Err(RemoteError::Injected(format!("rename {}", id)));
        }

        let node = tree.nodes.get_mut(id).ok_or_else(|| RemoteError::Status {
            code: 404,
            body: format!("entry {} not found", id),
        })?;
        node.entry.name = new_name.to_string();
        self.mutations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_by_offset() {
        let dir = MemoryDirectory::new("root").with_page_size(2);
        dir.add_item("root", "a");
        dir.add_item("root", "b");
        dir.add_item("root", "c");

        let first = dir.list_page("root", EntryFilter::Any, None).await.unwrap();
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.next_page_token.as_deref(), Some("2"));

        let second = dir
            .list_page("root", EntryFilter::Any, Some("2"))
            .await
            .unwrap();
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.entries[0].name, "c");
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_page_token_past_the_end_is_empty() {
        let dir = MemoryDirectory::new("root").with_page_size(2);
        dir.add_item("root", "a");

        let token = usize::MAX.to_string();
        let page = dir
            .list_page("root", EntryFilter::Any, Some(&token))
            .await
            .unwrap();
        assert!(page.entries.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_find_respects_type_filter() {
        let dir = MemoryDirectory::new("root");
        dir.add_item("root", "Shared");
        let folder = dir.add_container("root", "Shared");

        let found = dir
            .find_one_by_name("root", "Shared", EntryFilter::Containers)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, folder);
        assert!(
            dir.find_one_by_name("root", "shared", EntryFilter::Any)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_rename_failure_injection() {
        let dir = MemoryDirectory::new("root");
        let id = dir.add_item("root", "x");
        dir.fail_rename(&id);
        assert!(dir.rename(&id, "y").await.is_err());
        assert_eq!(dir.mutation_count(), 0);
        assert_eq!(dir.name_of(&id).as_deref(), Some("x"));
    }
}
