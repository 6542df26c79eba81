//! Google Sheets backend for the ledger store

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RemoteError;
use crate::ledger::store::LedgerStore;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheets {
    http: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

impl GoogleSheets {
    pub fn new(http: Client, api_base: &str, spreadsheet_id: &str, access_token: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn values_url(&self, range: &str) -> Result<reqwest::Url, RemoteError> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/spreadsheets/{}/values/",
            self.api_base, self.spreadsheet_id
        ))
        .map_err(|e| RemoteError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Transport("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .push(range);
        Ok(url)
    }
}

/// Renders a cell the way the sheet displays it
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
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
impl LedgerStore for GoogleSheets {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, RemoteError> {
        let response = self
            .http
            .get(self.values_url(range)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body: ValueRange = check(response).await?.json().await?;

        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), RemoteError> {
        let response = self
            .http
            .put(self.values_url(range)?)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&serde_json::json!({ "range": range, "values": rows }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
