//! Firestore backend for change notifications
//!
//! Writes the event into one fixed document. The update mask names only the
//! event fields, so unrelated fields in the document survive.

use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::RemoteError;
use crate::notify::channel::{ChangeEvent, ChangeNotifier};

pub const DEFAULT_API_BASE: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DOCUMENT_PATH: &str = "pinfo-trigger/changeProjectName";

const EVENT_FIELDS: [&str; 5] = ["clientKey", "project", "value", "changeId", "date"];

pub struct FirestoreNotifier {
    http: Client,
    api_base: String,
    project_id: String,
    document_path: String,
    access_token: String,
}

impl FirestoreNotifier {
    pub fn new(
        http: Client,
        api_base: &str,
        project_id: &str,
        document_path: &str,
        access_token: &str,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            document_path: document_path.trim_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn document_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.api_base, self.project_id, self.document_path
        )
    }
}

/// Firestore typed-value document body for an event
pub fn document_body(event: &ChangeEvent) -> Value {
    json!({
        "fields": {
            "clientKey": { "stringValue": event.client_key },
            "project": { "stringValue": event.project },
            "value": { "stringValue": event.value },
            "changeId": { "booleanValue": event.change_id },
            "date": { "stringValue": event.date },
        }
    })
}

#[async_trait]
impl ChangeNotifier for FirestoreNotifier {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), RemoteError> {
        let mask: Vec<(&str, &str)> = EVENT_FIELDS
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();

        let response = self
            .http
            .patch(self.document_url())
            .bearer_auth(&self.access_token)
            .query(&mask)
            .json(&document_body(event))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                code: status.as_u16(),
                body,
            });
        }

        info!("Change notification published to {}", self.document_path);
        Ok(())
    }
}
