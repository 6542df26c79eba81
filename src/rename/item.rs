//! Single-entry rename primitive shared by every renaming component
//!
//! The fragment is a literal substring and only its first occurrence is
//! replaced. A name that would not change is never sent to storage.

use log::debug;

use crate::error::RemoteError;
use crate::storage::{DirectoryClient, DirectoryEntry};

/// New name for `name`, or `None` when substituting would leave it unchanged
pub fn substitute(name: &str, old_fragment: &str, new_fragment: &str) -> Option<String> {
    if old_fragment.is_empty() {
        return None;
    }
    let renamed = name.replacen(old_fragment, new_fragment, 1);
    (renamed != name).then_some(renamed)
}

/// Renames `entry` in storage; `Ok(false)` means nothing needed to change
pub async fn rename_item(
    client: &dyn DirectoryClient,
    entry: &DirectoryEntry,
    old_fragment: &str,
    new_fragment: &str,
) -> Result<bool, RemoteError> {
    let Some(new_name) = substitute(&entry.name, old_fragment, new_fragment) else {
        return Ok(false);
    };

    client.rename(&entry.id, &new_name).await?;
    debug!("Renamed {} \"{}\" -> \"{}\"", entry.id, entry.name, new_name);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDirectory;

    #[test]
    fn test_substitute_first_occurrence_only() {
        assert_eq!(
            substitute("OldCo - OldCo notes", "OldCo", "NewCo").as_deref(),
            Some("NewCo - OldCo notes")
        );
    }

    #[test]
    fn test_substitute_is_literal() {
        assert_eq!(substitute("a.c", "a.c", "x").as_deref(), Some("x"));
        assert_eq!(substitute("abc", "a.c", "x"), None);
        assert_eq!(substitute("100 - (Old)", "(Old)", "[New]").as_deref(), Some("100 - [New]"));
    }

    #[test]
    fn test_substitute_no_match_or_identity() {
        assert_eq!(substitute("Budget.xlsx", "OldCo", "NewCo"), None);
        assert_eq!(substitute("OldCo", "OldCo", "OldCo"), None);
        assert_eq!(substitute("OldCo", "", "NewCo"), None);
    }

    #[tokio::test]
    async fn test_rename_item_noop_issues_no_mutation() {
        let dir = MemoryDirectory::new("root");
        let id = dir.add_item("root", "Budget.xlsx");
        let entry = DirectoryEntry {
            id: id.clone(),
            name: "Budget.xlsx".into(),
            is_container: false,
        };

        let renamed = rename_item(&dir, &entry, "OldCo", "NewCo").await.unwrap();
        assert!(!renamed);
        assert_eq!(dir.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_rename_item_issues_one_mutation() {
        let dir = MemoryDirectory::new("root");
        let id = dir.add_item("root", "OldCo plan.docx");
        let entry = DirectoryEntry {
            id: id.clone(),
            name: "OldCo plan.docx".into(),
            is_container: false,
        };

        assert!(rename_item(&dir, &entry, "OldCo", "NewCo").await.unwrap());
        assert_eq!(dir.mutation_count(), 1);
        assert_eq!(dir.name_of(&id).as_deref(), Some("NewCo plan.docx"));
    }
}
