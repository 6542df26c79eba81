use async_trait::async_trait;
use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, State};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use std::sync::Arc;
use std::time::Duration;

use project_rename_server::config::AppConfig;
use project_rename_server::error::RemoteError;
use project_rename_server::ledger::{LedgerStore, MemoryLedger};
use project_rename_server::notify::{ChangeNotifier, MemoryNotifier};
use project_rename_server::server::handlers::{RenameProjectBody, rename_project_handler};
use project_rename_server::server::{AppState, Backends, Server};
use project_rename_server::storage::{
    DirectoryClient, DirectoryEntry, EntryFilter, EntryPage, MemoryDirectory,
};

// Helper to build a memory-backed configuration
fn test_config(deadline_secs: u64) -> AppConfig {
    let toml = format!(
        r#"
        [server]
        backend = "memory"
        [drive]
        drive_id = "root"
        [job]
        deadline_secs = {}
        "#,
        deadline_secs
    );
    let config: AppConfig = config::Config::builder()
        .add_source(config::File::from_str(&toml, config::FileFormat::Toml))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();
    config.validate().unwrap();
    config
}

struct Fixture {
    dir: Arc<MemoryDirectory>,
    ledger: Arc<MemoryLedger>,
    notifier: Arc<MemoryNotifier>,
    state: AppState,
}

// Helper to seed a vendor, a project subtree, a shortcut and a ledger row
fn setup() -> Fixture {
    let dir = Arc::new(MemoryDirectory::new("root").with_page_size(2));
    let vendor = dir.add_container("root", "VendorX");
    let project = dir.add_container(&vendor, "100 - OldCo");
    let phase = dir.add_container(&project, "Phase 1");
    dir.add_container(&phase, "100 - OldCo Permits");
    dir.add_container(&project, "Photos");
    dir.add_item(&project, "100 - OldCo schedule.xlsx");
    dir.add_item(&project, "contacts.csv");
    dir.add_item(&phase, "100 - OldCo permit.pdf");
    dir.add_item(&phase, "map.png");
    dir.add_item(&phase, "readme.md");
    let active = dir.add_container("root", "Projects Active");
    let shortcut = dir.add_container(&active, "100 - OldCo");
    dir.add_item(&shortcut, "100 - OldCo");

    let ledger = Arc::new(MemoryLedger::new());
    ledger.set("B", 2, "Project ID");
    ledger.set("C", 2, "Project Name");
    ledger.set("B", 3, "100");
    ledger.set("C", 3, "OldCo");

    let notifier = Arc::new(MemoryNotifier::new());

    let server = Server::with_backends(
        test_config(30),
        Backends {
            directory: dir.clone(),
            ledger: ledger.clone(),
            notifier: notifier.clone(),
        },
    );

    Fixture {
        dir,
        ledger,
        notifier,
        state: server.state(),
    }
}

fn payload(body: RenameProjectBody) -> Result<Json<RenameProjectBody>, JsonRejection> {
    Ok(Json(body))
}

fn body(previous: &str, current: &str, vendor: &str) -> RenameProjectBody {
    RenameProjectBody {
        previous_name: Some(previous.to_string()),
        current_name: Some(current.to_string()),
        vendor_name: Some(vendor.to_string()),
    }
}

async fn read_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_rename_project_end_to_end() {
    let fx = setup();

    let response = rename_project_handler(
        State(fx.state.clone()),
        payload(body("100 - OldCo", "100 - NewCo", "VendorX")),
    )
    .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], true);
    assert_eq!(json["data"]["message"], "Project renamed successfully");
    assert_eq!(json["data"]["foldersRenamed"], 2);
    assert_eq!(json["data"]["filesRenamed"], 2);
    assert_eq!(json["data"]["shortcutsRenamed"], 2);
    assert_eq!(json["data"]["totalRenamed"], 6);

    let leftover: Vec<String> = fx
        .dir
        .descendant_names("root")
        .into_iter()
        .filter(|name| name.contains("OldCo"))
        .collect();
    assert!(leftover.is_empty(), "not renamed: {leftover:?}");

    assert_eq!(fx.ledger.get("B", 3).as_deref(), Some("100"));
    let status_cell: serde_json::Value =
        serde_json::from_str(&fx.ledger.get("AC", 3).unwrap()).unwrap();
    assert_eq!(status_cell["totalRenamed"], 6);
    assert_eq!(fx.notifier.events().len(), 1);
}

#[tokio::test]
async fn test_second_run_finds_nothing_to_rename() {
    let fx = setup();
    rename_project_handler(
        State(fx.state.clone()),
        payload(body("100 - OldCo", "100 - NewCo", "VendorX")),
    )
    .await;
    let mutations = fx.dir.mutation_count();

    let response = rename_project_handler(
        State(fx.state.clone()),
        payload(body("100 - OldCo", "100 - NewCo", "VendorX")),
    )
    .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["stage"], "resolve_project");
    assert_eq!(fx.dir.mutation_count(), mutations);
}

#[tokio::test]
async fn test_missing_field_is_rejected() {
    let fx = setup();
    let response = rename_project_handler(
        State(fx.state.clone()),
        payload(RenameProjectBody {
            previous_name: Some("100 - OldCo".into()),
            current_name: None,
            vendor_name: Some("VendorX".into()),
        }),
    )
    .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], false);
    assert_eq!(json["error"], "currentName is required");
    assert_eq!(fx.dir.mutation_count(), 0);
}

#[tokio::test]
async fn test_unknown_vendor_touches_nothing() {
    let fx = setup();
    let response = rename_project_handler(
        State(fx.state.clone()),
        payload(body("100 - OldCo", "100 - NewCo", "Acme")),
    )
    .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Vendor folder \"Acme\" not found in namespace root");
    assert_eq!(fx.dir.mutation_count(), 0);
    assert!(fx.notifier.events().is_empty());
    // Best-effort failure record still lands in the ledger row.
    assert_eq!(fx.ledger.get("AC", 3).as_deref(), Some("renamingError"));
}

#[tokio::test]
async fn test_missing_ledger_row_is_distinct_conflict() {
    let fx = setup();
    fx.ledger.set("B", 3, "555");

    let response = rename_project_handler(
        State(fx.state.clone()),
        payload(body("100 - OldCo", "100 - NewCo", "VendorX")),
    )
    .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["stage"], "locate_ledger_row");
    assert_eq!(json["data"]["foldersRenamed"], 2);
    assert!(fx.dir.mutation_count() > 0);
    assert_eq!(fx.ledger.write_count(), 0);
}

/// Directory client whose every call stalls past any reasonable deadline
struct StalledDirectory;

#[async_trait]
impl DirectoryClient for StalledDirectory {
    async fn list_page(
        &self,
        _container_id: &str,
        _filter: EntryFilter,
        _page_token: Option<&str>,
    ) -> Result<EntryPage, RemoteError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(EntryPage::default())
    }

    async fn find_one_by_name(
        &self,
        _container_id: &str,
        _name: &str,
        _filter: EntryFilter,
    ) -> Result<Option<DirectoryEntry>, RemoteError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn rename(&self, _id: &str, _new_name: &str) -> Result<(), RemoteError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expiry_is_gateway_timeout() {
    let ledger = Arc::new(MemoryLedger::new());
    ledger.set("B", 3, "100");
    ledger.set("C", 3, "OldCo");
    let ledger_store: Arc<dyn LedgerStore> = ledger.clone();
    let notifier: Arc<dyn ChangeNotifier> = Arc::new(MemoryNotifier::new());

    let server = Server::with_backends(
        test_config(5),
        Backends {
            directory: Arc::new(StalledDirectory),
            ledger: ledger_store,
            notifier,
        },
    );

    let response = rename_project_handler(
        State(server.state()),
        payload(body("100 - OldCo", "100 - NewCo", "VendorX")),
    )
    .await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["error"], "Rename job exceeded its 5s deadline");
    assert_eq!(ledger.get("AD", 3).as_deref(), Some("Rename job exceeded its 5s deadline"));
}

#[tokio::test]
async fn test_malformed_json_gets_structured_error() {
    let fx = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/rename-project")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let rejected = Json::<RenameProjectBody>::from_request(request, &()).await;
    assert!(rejected.is_err());

    let response = rename_project_handler(State(fx.state.clone()), rejected).await;
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse the request body as JSON")
    );
    assert_eq!(fx.dir.mutation_count(), 0);
}

/// Ledger store whose reads never come back in time
struct StalledLedger;

#[async_trait]
impl LedgerStore for StalledLedger {
    async fn read_range(&self, _range: &str) -> Result<Vec<Vec<String>>, RemoteError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn write_range(&self, _range: &str, _rows: Vec<Vec<String>>) -> Result<(), RemoteError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_ledger_cannot_outlive_deadline() {
    let dir = Arc::new(MemoryDirectory::new("root"));
    let vendor = dir.add_container("root", "VendorX");
    dir.add_container(&vendor, "100 - OldCo");
    let notifier: Arc<dyn ChangeNotifier> = Arc::new(MemoryNotifier::new());

    let server = Server::with_backends(
        test_config(5),
        Backends {
            directory: dir.clone(),
            ledger: Arc::new(StalledLedger),
            notifier,
        },
    );

    let started = tokio::time::Instant::now();
    let response = rename_project_handler(
        State(server.state()),
        payload(body("100 - OldCo", "100 - NewCo", "VendorX")),
    )
    .await;
    let elapsed = started.elapsed();
    let (status, _) = read_json(response).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    // Job deadline plus at most one deadline for the failure record.
    assert!(elapsed <= Duration::from_secs(10), "took {elapsed:?}");
}
