//! HTTP handlers
//!
//! `POST /rename-project` runs one job under the configured deadline;
//! `GET /health` reports liveness.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RenameError;
use crate::error::handlers::{error_to_http_status, handle_error};
use crate::rename::{RenameJobRequest, RenameOrchestrator, RenameReport};

pub const SUCCESS_MESSAGE: &str = "Project renamed successfully";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RenameOrchestrator>,
    pub deadline: Duration,
}

/// Request body; fields are optional so each missing one can be named
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameProjectBody {
    pub previous_name: Option<String>,
    pub current_name: Option<String>,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportBody<'a> {
    pub message: &'static str,
    #[serde(flatten)]
    pub report: &'a RenameReport,
}

impl RenameProjectBody {
    fn into_request(self) -> Result<RenameJobRequest, &'static str> {
        fn required(value: Option<String>, error: &'static str) -> Result<String, &'static str> {
            value.filter(|v| !v.is_empty()).ok_or(error)
        }

        Ok(RenameJobRequest {
            previous_name: required(self.previous_name, "previousName is required")?,
            current_name: required(self.current_name, "currentName is required")?,
            vendor_name: required(self.vendor_name, "vendorName is required")?,
        })
    }
}

fn error_response(status: StatusCode, error: &RenameError) -> Response {
    let mut body = json!({
        "status": false,
        "error": error.to_string(),
    });
    if let Some(stage) = error.stage() {
        body["stage"] = json!(stage.as_str());
    }
    if let RenameError::LedgerRowNotFound { report, .. } = error {
        body["data"] = json!(report);
    }
    (status, Json(body)).into_response()
}

/// Runs the job under the deadline; expiry counts as a fatal failure
pub async fn run_with_deadline(
    state: &AppState,
    request: &RenameJobRequest,
) -> Result<RenameReport, RenameError> {
    match tokio::time::timeout(state.deadline, state.orchestrator.run(request)).await {
        Ok(result) => result,
        Err(_) => Err(RenameError::DeadlineExceeded {
            secs: state.deadline.as_secs(),
        }),
    }
}

/// Writes the failure to the ledger row, bounded by the job deadline
pub async fn record_failure_with_deadline(
    state: &AppState,
    request: &RenameJobRequest,
    error: &RenameError,
) {
    let record = state.orchestrator.record_failure(request, error);
    if tokio::time::timeout(state.deadline, record).await.is_err() {
        warn!(
            "Gave up recording failure for \"{}\" after {}s",
            request.previous_name,
            state.deadline.as_secs()
        );
    }
}

pub async fn rename_project_handler(
    State(state): State<AppState>,
    payload: Result<Json<RenameProjectBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(json!({ "status": false, "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let request = match body.into_request() {
        Ok(request) => request,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": false, "error": message })),
            )
                .into_response();
        }
    };

    match run_with_deadline(&state, &request).await {
        Ok(report) => {
            info!(
                "Renamed {} -> {} ({} entries)",
                request.previous_name, request.current_name, report.total_renamed
            );
            let data = ReportBody {
                message: SUCCESS_MESSAGE,
                report: &report,
            };
            (
                StatusCode::OK,
                Json(json!({ "status": true, "data": data })),
            )
                .into_response()
        }
        Err(error) => {
            handle_error(&error);
            record_failure_with_deadline(&state, &request, &error).await;
            let status = StatusCode::from_u16(error_to_http_status(&error))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, &error)
        }
    }
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Project rename API is running",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_named_in_order() {
        let body = RenameProjectBody {
            previous_name: None,
            current_name: Some("b".into()),
            vendor_name: None,
        };
        assert_eq!(body.into_request().unwrap_err(), "previousName is required");

        let body = RenameProjectBody {
            previous_name: Some("a".into()),
            current_name: Some(String::new()),
            vendor_name: Some("v".into()),
        };
        assert_eq!(body.into_request().unwrap_err(), "currentName is required");
    }

    #[test]
    fn test_report_body_is_flat() {
        let report = RenameReport::new(2, 1, 0, 0.25);
        let json = serde_json::to_value(ReportBody {
            message: SUCCESS_MESSAGE,
            report: &report,
        })
        .unwrap();
        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["foldersRenamed"], 2);
        assert_eq!(json["totalRenamed"], 3);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health_handler().await;
        assert_eq!(body["status"], "ok");
    }
}
