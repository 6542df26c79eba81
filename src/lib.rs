pub mod config;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod rename;
pub mod server;
pub mod storage;

pub use rename::{RenameJobRequest, RenameOrchestrator, RenameReport};
pub use server::Server;
