//! Google Drive backend
//!
//! Drive v3 REST calls scoped to one shared drive. The bearer token is
//! supplied by configuration.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::error::RemoteError;
use crate::storage::client::{DirectoryClient, DirectoryEntry, EntryFilter, EntryPage};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
}

impl From<DriveFile> for DirectoryEntry {
    fn from(file: DriveFile) -> Self {
        DirectoryEntry {
            is_container: file.mime_type == FOLDER_MIME_TYPE,
            id: file.id,
            name: file.name,
        }
    }
}

pub struct GoogleDrive {
    http: Client,
    api_base: String,
    drive_id: String,
    access_token: String,
    page_size: u32,
}

impl GoogleDrive {
    pub fn new(
        http: Client,
        api_base: &str,
        drive_id: &str,
        access_token: &str,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            drive_id: drive_id.to_string(),
            access_token: access_token.to_string(),
            page_size,
        }
    }

    fn files_list(&self, query: String, page_size: u32, page_token: Option<&str>) -> RequestBuilder {
        let mut params = vec![
            ("q", query),
            ("fields", "nextPageToken, files(id, name, mimeType)".to_string()),
            ("pageSize", page_size.to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("includeItemsFromAllDrives", "true".to_string()),
            ("corpora", "drive".to_string()),
            ("driveId", self.drive_id.clone()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        self.http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&self.access_token)
            .query(&params)
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the Drive search expression for the children of `parent_id`
pub fn build_query(parent_id: &str, name: Option<&str>, filter: EntryFilter) -> String {
    let mut query = format!(
        "'{}' in parents and trashed = false",
        escape_query_value(parent_id)
    );
    if let Some(name) = name {
        query.push_str(&format!(" and name = '{}'", escape_query_value(name)));
    }
    match filter {
        EntryFilter::Any => {}
        EntryFilter::Containers => {
            query.push_str(&format!(" and mimeType = '{}'", FOLDER_MIME_TYPE))
        }
        EntryFilter::Items => {
            query.push_str(&format!(" and mimeType != '{}'", FOLDER_MIME_TYPE))
        }
    }
    query
}

async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        code: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DirectoryClient for GoogleDrive {
    async fn list_page(
        &self,
        container_id: &str,
        filter: EntryFilter,
        page_token: Option<&str>,
    ) -> Result<EntryPage, RemoteError> {
        let query = build_query(container_id, None, filter);
        let response = self
            .files_list(query, self.page_size, page_token)
            .send()
            .await?;
        let list: FileList = check(response).await?.json().await?;

        debug!(
            "Drive page for {} returned {} entries",
            container_id,
            list.files.len()
        );

        Ok(EntryPage {
            entries: list.files.into_iter().map(DirectoryEntry::from).collect(),
            next_page_token: list.next_page_token,
        })
    }

    async fn find_one_by_name(
        &self,
        container_id: &str,
        name: &str,
        filter: EntryFilter,
    ) -> Result<Option<DirectoryEntry>, RemoteError> {
        let query = build_query(container_id, Some(name), filter);
        let response = self.files_list(query, 1, None).send().await?;
        let list: FileList = check(response).await?.json().await?;

        Ok(list.files.into_iter().next().map(DirectoryEntry::from))
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .patch(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&self.access_token)
            .query(&[("supportsAllDrives", "true")])
            .json(&serde_json::json!({ "name": new_name }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
