//! Error types
//!
//! Defines the failure of a single remote call, the rename job taxonomy,
//! and server startup errors.

use std::fmt;
use std::io;

use crate::rename::{RenameReport, Stage};

/// Failure of one call against a remote backend (storage, ledger or notifier)
#[derive(Debug)]
pub enum RemoteError {
    Transport(String),
    Status { code: u16, body: String },
    Decode(String),
    Injected(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "Transport error: {}", msg),
            RemoteError::Status { code, body } => {
                write!(f, "Remote returned status {}: {}", code, body)
            }
            RemoteError::Decode(msg) => write!(f, "Malformed remote payload: {}", msg),
            RemoteError::Injected(msg) => write!(f, "Injected failure: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            RemoteError::Decode(error.to_string())
        } else {
            RemoteError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(error: serde_json::Error) -> Self {
        RemoteError::Decode(error.to_string())
    }
}

/// Errors that abort a rename job
#[derive(Debug)]
pub enum RenameError {
    /// Missing or equal name fragments; nothing was touched.
    InvalidRequest(String),
    NotFound {
        stage: Stage,
        subject: String,
    },
    /// Storage was fully renamed but the ledger row could not be located,
    /// so the ledger still shows the previous name.
    LedgerRowNotFound {
        previous_name: String,
        report: RenameReport,
    },
    RemoteOperationFailure {
        stage: Stage,
        subject: String,
        source: RemoteError,
    },
    TraversalLimitExceeded {
        limit: usize,
    },
    DeadlineExceeded {
        secs: u64,
    },
}

impl RenameError {
    pub fn remote(stage: Stage, subject: impl Into<String>, source: RemoteError) -> Self {
        RenameError::RemoteOperationFailure {
            stage,
            subject: subject.into(),
            source,
        }
    }

    /// Stage the job was in when it failed, when known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RenameError::InvalidRequest(_) => Some(Stage::Validate),
            RenameError::NotFound { stage, .. } => Some(*stage),
            RenameError::LedgerRowNotFound { .. } => Some(Stage::LocateLedgerRow),
            RenameError::RemoteOperationFailure { stage, .. } => Some(*stage),
            RenameError::TraversalLimitExceeded { .. } => None,
            RenameError::DeadlineExceeded { .. } => None,
        }
    }
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            RenameError::NotFound { stage, subject } => match stage {
                Stage::ResolveVendor => {
                    write!(f, "Vendor folder \"{}\" not found in namespace root", subject)
                }
                Stage::ResolveProject => {
                    write!(f, "Project \"{}\" not found in vendor folder", subject)
                }
                other => write!(f, "\"{}\" not found during {}", subject, other),
            },
            RenameError::LedgerRowNotFound { previous_name, .. } => write!(
                f,
                "Storage renamed but ledger row \"{}\" not found; ledger not updated",
                previous_name
            ),
            RenameError::RemoteOperationFailure {
                stage,
                subject,
                source,
            } => write!(f, "Remote call failed during {} ({}): {}", stage, subject, source),
            RenameError::TraversalLimitExceeded { limit } => write!(
                f,
                "Traversal aborted after visiting {} containers",
                limit
            ),
            RenameError::DeadlineExceeded { secs } => {
                write!(f, "Rename job exceeded its {}s deadline", secs)
            }
        }
    }
}

impl std::error::Error for RenameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenameError::RemoteOperationFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while bringing the server up
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Http(reqwest::Error),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Http(e) => write!(f, "HTTP client error: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(error: reqwest::Error) -> Self {
        ServerError::Http(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_not_found_message() {
        let err = RenameError::NotFound {
            stage: Stage::ResolveVendor,
            subject: "Acme".into(),
        };
        assert_eq!(
            err.to_string(),
            "Vendor folder \"Acme\" not found in namespace root"
        );
        assert_eq!(err.stage(), Some(Stage::ResolveVendor));
    }

    #[test]
    fn test_remote_failure_carries_stage_and_source() {
        let err = RenameError::remote(
            Stage::RenameFiles,
            "file-7",
            RemoteError::Status {
                code: 503,
                body: "backend unavailable".into(),
            },
        );
        assert_eq!(err.stage(), Some(Stage::RenameFiles));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("rename_files"));
        assert!(err.to_string().contains("503"));
    }
}
