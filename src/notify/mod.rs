//! Real-time change notifications

pub mod channel;
pub mod firestore;
pub mod memory;

pub use channel::{ChangeEvent, ChangeNotifier};
pub use firestore::FirestoreNotifier;
pub use memory::MemoryNotifier;
