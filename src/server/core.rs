use axum::Router;
use axum::routing::{get, post};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppConfig, BackendKind};
use crate::error::ServerError;
use crate::ledger::{GoogleSheets, LedgerBridge, LedgerStore, MemoryLedger};
use crate::notify::{ChangeNotifier, FirestoreNotifier, MemoryNotifier};
use crate::rename::RenameOrchestrator;
use crate::server::handlers::{AppState, health_handler, rename_project_handler};
use crate::storage::{DirectoryClient, GoogleDrive, MemoryDirectory};

pub struct Server {
    config: Arc<AppConfig>,
    state: AppState,
}

/// Handles to the three remote backends, constructed once per process
pub struct Backends {
    pub directory: Arc<dyn DirectoryClient>,
    pub ledger: Arc<dyn LedgerStore>,
    pub notifier: Arc<dyn ChangeNotifier>,
}

impl Backends {
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        match config.server.backend {
            BackendKind::Google => {
                let http = reqwest::Client::builder()
                    .user_agent(concat!("project-rename-server/", env!("CARGO_PKG_VERSION")))
                    .timeout(config.remote_timeout())
                    .build()?;
                Ok(Self {
                    directory: Arc::new(GoogleDrive::new(
                        http.clone(),
                        &config.drive.api_base,
                        &config.drive.drive_id,
                        &config.drive.access_token,
                        config.drive.page_size,
                    )),
                    ledger: Arc::new(GoogleSheets::new(
                        http.clone(),
                        &config.ledger.api_base,
                        &config.ledger.spreadsheet_id,
                        &config.ledger.access_token,
                    )),
                    notifier: Arc::new(FirestoreNotifier::new(
                        http,
                        &config.notify.api_base,
                        &config.notify.project_id,
                        &config.notify.document_path,
                        &config.notify.access_token,
                    )),
                })
            }
            BackendKind::Memory => Ok(Self {
                directory: Arc::new(
                    MemoryDirectory::new(&config.drive.drive_id)
                        .with_page_size(config.drive.page_size as usize),
                ),
                ledger: Arc::new(MemoryLedger::new()),
                notifier: Arc::new(MemoryNotifier::new()),
            }),
        }
    }
}

/// Routes of the inbound API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/rename-project", post(rename_project_handler))
        .with_state(state)
}

impl Server {
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let backends = Backends::from_config(&config)?;
        Ok(Self::with_backends(config, backends))
    }

    pub fn with_backends(config: AppConfig, backends: Backends) -> Self {
        let ledger = LedgerBridge::new(backends.ledger, config.ledger_layout());
        let orchestrator = RenameOrchestrator::new(
            backends.directory,
            ledger,
            backends.notifier,
            config.rename_options(),
        );

        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            deadline: config.job_deadline(),
        };

        Self {
            config: Arc::new(config),
            state,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub async fn start(&self) -> Result<(), ServerError> {
        let socket = self.config.listen_socket();
        let listener = TcpListener::bind(&socket).await?;

        info!(
            "Project rename API running on {} ({:?} backend, {}s job deadline)",
            socket, self.config.server.backend, self.config.job.deadline_secs
        );
        info!("Health check: GET http://{}/health", socket);
        info!("Rename endpoint: POST http://{}/rename-project", socket);

        axum::serve(listener, router(self.state())).await?;
        Ok(())
    }
}
