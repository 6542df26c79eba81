//! Server core functionality
//!
//! Backend wiring, the HTTP router and its handlers.

pub mod core;
pub mod handlers;

pub use self::core::{Backends, Server, router};
pub use handlers::AppState;
