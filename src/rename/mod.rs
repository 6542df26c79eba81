//! Hierarchical project rename
//!
//! Name resolution, the recursive walker, shortcut synchronization and the
//! orchestrator that sequences them into one job.

pub mod events;
pub mod item;
pub mod lookup;
pub mod orchestrator;
pub mod results;
pub mod shortcut;
pub mod walker;

pub use events::{LogObserver, RecordingObserver, RenameObserver, Stage, StageEvent};
pub use item::{rename_item, substitute};
pub use lookup::NameLookup;
pub use orchestrator::{RenameOptions, RenameOrchestrator};
pub use results::{RenameJobRequest, RenameReport, WalkCounts};
pub use shortcut::ShortcutSync;
pub use walker::TreeWalker;
