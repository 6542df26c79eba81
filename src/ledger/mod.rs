//! Status ledger
//!
//! Row matching and status encoding over a spreadsheet-like store.

pub mod bridge;
pub mod layout;
pub mod memory;
pub mod sheets;
pub mod store;

pub use bridge::{LedgerBridge, LedgerStatus, identifier_of};
pub use layout::LedgerLayout;
pub use memory::MemoryLedger;
pub use sheets::GoogleSheets;
pub use store::LedgerStore;
