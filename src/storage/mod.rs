//! Remote storage access
//!
//! The directory client capability plus its Google Drive and in-memory backends.

pub mod client;
pub mod drive;
pub mod memory;

pub use client::{DirectoryClient, DirectoryEntry, EntryFilter, EntryPage, list_all};
pub use drive::GoogleDrive;
pub use memory::MemoryDirectory;
