//! In-process backend
//!
//! Rows live in a map keyed by sheet name. Appends push the submitted row;
//! updates find the row whose first cell equals `uniqueId` (compared as text)
//! and overwrite the submitted cells.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{PostPayload, SheetBackend, WriteOutcome};
use crate::error::{PlantError, PlantResult};
use crate::types::Row;

#[derive(Default)]
pub struct MemorySheetBackend {
    sheets: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemorySheetBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `sheet` with rows, replacing what was there
    pub fn with_rows(self, sheet: impl Into<String>, rows: Vec<Row>) -> Self {
        self.lock().insert(sheet.into(), rows);
        self
    }

    /// Snapshot of the rows currently held for `sheet`
    pub fn rows(&self, sheet: &str) -> Vec<Row> {
        self.lock().get(sheet).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Row>>> {
        self.sheets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetBackend for MemorySheetBackend {
    async fn fetch_rows(&self, sheet: &str) -> PlantResult<Vec<Row>> {
        let sheets = self.lock();
        sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| PlantError::Backend(format!("Hoja '{}' no encontrada", sheet)))
    }

    async fn post(&self, payload: &PostPayload) -> PlantResult<WriteOutcome> {
        let mut sheets = self.lock();

        match payload.action.as_deref() {
            None => {
                let rows = sheets.entry(payload.sheet_name.clone()).or_default();
                rows.push(payload.new_row.clone());
                debug!(sheet = %payload.sheet_name, rows = rows.len(), "row appended");
                Ok(WriteOutcome::Confirmed)
            }
            Some(_) if payload.is_update() => {
                let id = payload.unique_id.as_deref().unwrap_or_default();
                let rows = sheets.get_mut(&payload.sheet_name).ok_or_else(|| {
                    PlantError::Backend(format!("Hoja '{}' no encontrada", payload.sheet_name))
                })?;
                let target = rows.iter_mut().find(|row| {
                    row.values()
                        .next()
                        .map(|first| cell_text(first) == id)
                        .unwrap_or(false)
                });
                match target {
                    Some(row) => {
                        for (header, value) in &payload.new_row {
                            row.insert(header.clone(), value.clone());
                        }
                        debug!(sheet = %payload.sheet_name, id, "row updated");
                        Ok(WriteOutcome::Confirmed)
                    }
                    None => Err(PlantError::Backend(format!(
                        "No se encontró el registro '{}'",
                        id
                    ))),
                }
            }
            Some(other) => Err(PlantError::Backend(format!(
                "Acción desconocida: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_unknown_sheet_fails() {
        let backend = MemorySheetBackend::new();
        let err = backend.fetch_rows("ordenes").await.unwrap_err();
        assert!(matches!(err, PlantError::Backend(_)));
    }

    #[tokio::test]
    async fn test_append_creates_sheet() {
        let backend = MemorySheetBackend::new();
        let payload = PostPayload::append("personal", row(&[("NOMBRE", json!("Eva"))]));

        let outcome = backend.post(&payload).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Confirmed);
        assert_eq!(backend.rows("personal").len(), 1);
    }

    #[tokio::test]
    async fn test_update_matches_first_cell_as_text() {
        let backend = MemorySheetBackend::new().with_rows(
            "productos",
            vec![
                row(&[("CÓDIGO", json!(100)), ("ACABADO", json!("Natural"))]),
                row(&[("CÓDIGO", json!("BIS-010")), ("ACABADO", json!("Natural"))]),
            ],
        );

        let payload = PostPayload::update("productos", "100", row(&[("ACABADO", json!("Pintado"))]));
        backend.post(&payload).await.unwrap();

        let rows = backend.rows("productos");
        assert_eq!(rows[0]["ACABADO"], json!("Pintado"));
        assert_eq!(rows[1]["ACABADO"], json!("Natural"));
    }

    #[tokio::test]
    async fn test_update_missing_row_fails() {
        let backend = MemorySheetBackend::new().with_rows("productos", vec![]);
        let payload = PostPayload::update("productos", "nope", Row::new());
        assert!(backend.post(&payload).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_action_fails() {
        let backend = MemorySheetBackend::new();
        let mut payload = PostPayload::append("productos", Row::new());
        payload.action = Some("delete".into());
        let err = backend.post(&payload).await.unwrap_err();
        assert!(err.to_string().contains("delete"));
        assert!(backend.fetch_rows("productos").await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_unknown_sheet_missing() {
        let backend = MemorySheetBackend::new();
        let payload = PostPayload::update("facturas", "1", Row::new());

        let err = backend.post(&payload).await.unwrap_err();

        assert!(err.to_string().contains("facturas"));
        assert!(matches!(
            backend.fetch_rows("facturas").await,
            Err(PlantError::Backend(_))
        ));
    }
}
