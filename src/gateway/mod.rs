//! Round-trips against the spreadsheet endpoint
//!
//! A [`SheetBackend`] knows how to fetch the header-keyed rows of a sheet and
//! how to submit a write. [`HttpSheetBackend`] talks to the deployed web-app
//! endpoint; [`MemorySheetBackend`] keeps rows in process for tests and offline
//! runs.
//!
//! There is no retry, no backoff and no concurrency control. A write made in
//! [`WriteMode::Opaque`] cannot observe the server's answer, so its outcome is
//! only ever [`WriteOutcome::Assumed`].

mod http;
mod memory;

pub use http::HttpSheetBackend;
pub use memory::MemorySheetBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlantError, PlantResult, DEFAULT_WRITE_MESSAGE};
use crate::types::Row;

/// Action name the endpoint understands for in-place edits
pub const UPDATE_ACTION: &str = "update";

/// How a write's response is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Read the response body and fail unless it reports success
    #[default]
    Confirmed,
    /// Fire the request without reading the answer
    Opaque,
}

/// What is known about a write after it was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// The endpoint answered `success: true`
    Confirmed,
    /// The request went out; the answer was never read
    Assumed,
}

/// Body of a POST to the endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub sheet_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub new_row: Row,
}

impl PostPayload {
    /// Append `row` to the end of the sheet
    pub fn append(sheet_name: impl Into<String>, row: Row) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            action: None,
            unique_id: None,
            new_row: row,
        }
    }

    /// Overwrite the cells given in `row` on the row identified by `unique_id`
    pub fn update(sheet_name: impl Into<String>, unique_id: impl Into<String>, row: Row) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            action: Some(UPDATE_ACTION.to_string()),
            unique_id: Some(unique_id.into()),
            new_row: row,
        }
    }

    pub fn is_update(&self) -> bool {
        self.action.as_deref() == Some(UPDATE_ACTION)
    }
}

#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// All rows of `sheet`, keyed by header
    async fn fetch_rows(&self, sheet: &str) -> PlantResult<Vec<Row>>;

    /// Submit an append or update
    async fn post(&self, payload: &PostPayload) -> PlantResult<WriteOutcome>;
}

/// Interpret the decoded body of a GET.
///
/// A list of objects is the happy path. An object with an `error` key carries
/// the script's own message. Anything else is not a sheet.
pub fn decode_sheet_payload(sheet: &str, payload: Value) -> PlantResult<Vec<Row>> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(PlantError::UnexpectedPayload {
                    sheet: sheet.to_string(),
                    detail: format!("row {} is not an object: {}", i, other),
                }),
            })
            .collect(),
        Value::Object(map) if map.contains_key("error") => {
            Err(PlantError::Backend(error_text(map.get("error"))))
        }
        other => Err(PlantError::UnexpectedPayload {
            sheet: sheet.to_string(),
            detail: format!("expected a list of rows, got {}", kind_of(&other)),
        }),
    }
}

/// Interpret the decoded body of a confirmed POST
pub fn decode_write_response(response: &Value) -> PlantResult<WriteOutcome> {
    if response.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(WriteOutcome::Confirmed);
    }
    let message = match response.get("error") {
        Some(Value::Null) | None => DEFAULT_WRITE_MESSAGE.to_string(),
        Some(value) => error_text(Some(value)),
    };
    Err(PlantError::Backend(message))
}

fn error_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => DEFAULT_WRITE_MESSAGE.to_string(),
        Some(other) => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_append_payload_shape() {
        let mut row = Row::new();
        row.insert("NOMBRE".into(), json!("Luis"));
        let payload = PostPayload::append("personal", row);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"sheetName": "personal", "newRow": {"NOMBRE": "Luis"}})
        );
        assert!(!payload.is_update());
    }

    #[test]
    fn test_update_payload_shape() {
        let mut row = Row::new();
        row.insert("ACABADO".into(), json!("Cromado"));
        let payload = PostPayload::update("productos", "BIS-010", row);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "sheetName": "productos",
                "action": "update",
                "uniqueId": "BIS-010",
                "newRow": {"ACABADO": "Cromado"}
            })
        );
        assert!(payload.is_update());
    }

    #[test]
    fn test_decode_list_of_rows() {
        let rows = decode_sheet_payload("personal", json!([{"NOMBRE": "A"}, {"NOMBRE": "B"}]))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["NOMBRE"], json!("B"));
    }

    #[test]
    fn test_decode_error_object() {
        let err = decode_sheet_payload("x", json!({"error": "Hoja 'x' no existe"})).unwrap_err();
        assert!(matches!(err, PlantError::Backend(ref m) if m == "Hoja 'x' no existe"));
    }

    #[test]
    fn test_decode_non_list_fails() {
        let err = decode_sheet_payload("ordenes", json!({"rows": []})).unwrap_err();
        assert!(matches!(err, PlantError::UnexpectedPayload { .. }));
        assert!(err.to_string().contains("an object"));

        let err = decode_sheet_payload("ordenes", json!("hola")).unwrap_err();
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn test_decode_list_with_scalar_row_fails() {
        let err = decode_sheet_payload("ordenes", json!([{"a": 1}, 5])).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_write_response_success() {
        assert_eq!(
            decode_write_response(&json!({"success": true})).unwrap(),
            WriteOutcome::Confirmed
        );
    }

    #[test]
    fn test_write_response_failure_messages() {
        let err = decode_write_response(&json!({"success": false, "error": "Fila duplicada"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Fila duplicada");

        let err = decode_write_response(&json!({"success": false})).unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_WRITE_MESSAGE);

        let err = decode_write_response(&json!({"ok": 1})).unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_WRITE_MESSAGE);
    }

    #[test]
    fn test_write_mode_from_yaml() {
        let mode: WriteMode = serde_yaml::from_str("opaque").unwrap();
        assert_eq!(mode, WriteMode::Opaque);
        assert_eq!(WriteMode::default(), WriteMode::Confirmed);
    }
}
