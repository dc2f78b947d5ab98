//! HTTP backend for the deployed spreadsheet web app

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    decode_sheet_payload, decode_write_response, PostPayload, SheetBackend, WriteMode,
    WriteOutcome,
};
use crate::error::{PlantError, PlantResult};
use crate::types::Row;

/// The endpoint expects a plain-text body so the browser skips the preflight.
const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

pub struct HttpSheetBackend {
    client: reqwest::Client,
    endpoint: String,
    write_mode: WriteMode,
}

impl HttpSheetBackend {
    pub fn new(
        endpoint: impl Into<String>,
        write_mode: WriteMode,
        timeout: Duration,
    ) -> PlantResult<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(PlantError::Config(
                "spreadsheet endpoint URL is empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plantops/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            write_mode,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// GET `<endpoint>?sheet=<name>`
    pub async fn fetch_from_sheet(&self, sheet_name: &str) -> PlantResult<Vec<Row>> {
        debug!(sheet = sheet_name, "fetching sheet");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("sheet", sheet_name)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(sheet = sheet_name, status = status.as_u16(), "sheet fetch failed");
            return Err(PlantError::Connection {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        let rows = decode_sheet_payload(sheet_name, payload)?;
        debug!(sheet = sheet_name, rows = rows.len(), "sheet fetched");
        Ok(rows)
    }

    /// POST the payload to `<endpoint>`
    pub async fn post_to_sheet(&self, payload: &PostPayload) -> PlantResult<WriteOutcome> {
        debug!(
            sheet = %payload.sheet_name,
            action = payload.action.as_deref().unwrap_or("append"),
            mode = ?self.write_mode,
            "posting row"
        );
        let body = serde_json::to_string(payload)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        if self.write_mode == WriteMode::Opaque {
            // Same blindness as a no-cors browser request: status and body are ignored.
            return Ok(WriteOutcome::Assumed);
        }

        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => decode_write_response(&value),
            Err(_) if !status.is_success() => Err(PlantError::Connection {
                status: status.as_u16(),
            }),
            Err(e) => Err(PlantError::UnexpectedPayload {
                sheet: payload.sheet_name.clone(),
                detail: format!("write response is not JSON: {}", e),
            }),
        }
    }
}

#[async_trait]
impl SheetBackend for HttpSheetBackend {
    async fn fetch_rows(&self, sheet: &str) -> PlantResult<Vec<Row>> {
        self.fetch_from_sheet(sheet).await
    }

    async fn post(&self, payload: &PostPayload) -> PlantResult<WriteOutcome> {
        self.post_to_sheet(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_is_rejected() {
        let result = HttpSheetBackend::new("  ", WriteMode::Confirmed, Duration::from_secs(5));
        assert!(matches!(result, Err(PlantError::Config(_))));
    }

    #[test]
    fn test_backend_keeps_settings() {
        let backend = HttpSheetBackend::new(
            "https://script.example.com/exec",
            WriteMode::Opaque,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(backend.endpoint(), "https://script.example.com/exec");
        assert_eq!(backend.write_mode(), WriteMode::Opaque);
    }
}
