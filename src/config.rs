//! Configuration management for the project rename server
//!
//! Loaded once at startup from `config.toml` with environment overrides
//! (`PROJECT_RENAME_<SECTION>__<KEY>`), then validated.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::ledger::LedgerLayout;
use crate::rename::RenameOptions;

/// Which implementation backs the storage, ledger and notifier seams
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Google,
    Memory,
}

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub job: JobConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSection {
    pub bind_address: String,
    pub port: u16,
    pub backend: BackendKind,
    /// Per-call limit on outbound requests to the Google APIs
    pub remote_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriveConfig {
    /// Shared drive id; doubles as the namespace root folder id
    pub drive_id: String,
    pub shortcut_container: String,
    pub page_size: u32,
    pub api_base: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub id_column: String,
    pub name_column: String,
    pub status_column: String,
    pub error_column: String,
    pub first_row: u32,
    pub last_row: Option<u32>,
    /// Write the in-progress token before storage is touched
    pub mark_in_progress: bool,
    pub api_base: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifyConfig {
    pub project_id: String,
    pub document_path: String,
    pub api_base: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JobConfig {
    pub deadline_secs: u64,
    pub max_containers: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            backend: BackendKind::Google,
            remote_timeout_secs: 30,
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            drive_id: String::new(),
            shortcut_container: crate::rename::shortcut::DEFAULT_SHORTCUT_CONTAINER.to_string(),
            page_size: 1000,
            api_base: crate::storage::drive::DEFAULT_API_BASE.to_string(),
            access_token: String::new(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let layout = LedgerLayout::default();
        Self {
            spreadsheet_id: String::new(),
            sheet_name: layout.sheet_name,
            id_column: layout.id_column,
            name_column: layout.name_column,
            status_column: layout.status_column,
            error_column: layout.error_column,
            first_row: layout.first_row,
            last_row: layout.last_row,
            mark_in_progress: false,
            api_base: crate::ledger::sheets::DEFAULT_API_BASE.to_string(),
            access_token: String::new(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            document_path: crate::notify::firestore::DEFAULT_DOCUMENT_PATH.to_string(),
            api_base: crate::notify::firestore::DEFAULT_API_BASE.to_string(),
            access_token: String::new(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 300,
            max_containers: crate::rename::walker::DEFAULT_MAX_CONTAINERS,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Container layout first, then the local development path
        let config_paths = ["project-rename-server/config", "config"];

        let mut builder = Config::builder();
        for path in config_paths {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("PROJECT_RENAME")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.server.remote_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "server.remote_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.drive.drive_id.is_empty() {
            return Err(config::ConfigError::Message(
                "drive.drive_id cannot be empty".into(),
            ));
        }

        if self.drive.shortcut_container.is_empty() {
            return Err(config::ConfigError::Message(
                "drive.shortcut_container cannot be empty".into(),
            ));
        }

        if self.drive.page_size == 0 || self.drive.page_size > 1000 {
            return Err(config::ConfigError::Message(
                "drive.page_size must be between 1 and 1000".into(),
            ));
        }

        self.ledger_layout()
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("ledger: {}", e)))?;

        if self.job.deadline_secs == 0 {
            return Err(config::ConfigError::Message(
                "job.deadline_secs must be greater than 0".into(),
            ));
        }

        if self.job.max_containers == 0 {
            return Err(config::ConfigError::Message(
                "job.max_containers must be greater than 0".into(),
            ));
        }

        if self.server.backend == BackendKind::Google {
            let required = [
                ("drive.access_token", &self.drive.access_token),
                ("ledger.spreadsheet_id", &self.ledger.spreadsheet_id),
                ("ledger.access_token", &self.ledger.access_token),
                ("notify.project_id", &self.notify.project_id),
                ("notify.access_token", &self.notify.access_token),
            ];
            for (key, value) in required {
                if value.is_empty() {
                    return Err(config::ConfigError::Message(format!(
                        "{} is required for the google backend",
                        key
                    )));
                }
            }
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.server.remote_timeout_secs)
    }

    pub fn job_deadline(&self) -> Duration {
        Duration::from_secs(self.job.deadline_secs)
    }

    pub fn ledger_layout(&self) -> LedgerLayout {
        LedgerLayout {
            sheet_name: self.ledger.sheet_name.clone(),
            id_column: self.ledger.id_column.to_ascii_uppercase(),
            name_column: self.ledger.name_column.to_ascii_uppercase(),
            status_column: self.ledger.status_column.to_ascii_uppercase(),
            error_column: self.ledger.error_column.to_ascii_uppercase(),
            first_row: self.ledger.first_row,
            last_row: self.ledger.last_row,
        }
    }

    pub fn rename_options(&self) -> RenameOptions {
        RenameOptions {
            root_id: self.drive.drive_id.clone(),
            shortcut_container: self.drive.shortcut_container.clone(),
            max_containers: self.job.max_containers,
            mark_in_progress: self.ledger.mark_in_progress,
        }
    }
}
