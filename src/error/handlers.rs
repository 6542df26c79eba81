//! Error handlers
//!
//! Maps job failures onto HTTP status codes and log output.

use log::{error, warn};

use crate::error::types::RenameError;

/// Log a job failure
pub fn handle_error(err: &RenameError) {
    match err {
        RenameError::InvalidRequest(_) | RenameError::NotFound { .. } => {
            warn!("Rename rejected: {}", err)
        }
        _ => error!("Rename failed: {}", err),
    }
}

/// Convert a job failure to the HTTP status returned to the caller
pub fn error_to_http_status(err: &RenameError) -> u16 {
    match err {
        RenameError::InvalidRequest(_) => 400,
        RenameError::NotFound { .. } => 404,
        RenameError::LedgerRowNotFound { .. } => 409,
        RenameError::RemoteOperationFailure { .. } => 502,
        RenameError::TraversalLimitExceeded { .. } => 500,
        RenameError::DeadlineExceeded { .. } => 504,
    }
}
