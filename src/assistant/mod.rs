//! AI-assisted drafting
//!
//! Three helpers sit on top of a text-generation model: a priority suggestion
//! for an order (schema-constrained JSON), a status email for the order's
//! client, and a short job description for a staff position. The model is
//! reached through [`GenerativeClient`]; [`GeminiClient`] is the production
//! implementation.

mod gemini;
pub mod prompts;

pub use gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{PlantError, PlantResult};
use crate::types::{PrioritySuggestion, ProductionOrder};

pub const INVALID_JSON_MESSAGE: &str = "La respuesta de la IA no es un JSON válido.";

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Freeform completion
    async fn generate_text(&self, prompt: &str) -> PlantResult<String>;

    /// Completion constrained to JSON matching `schema`; returns the raw text
    async fn generate_json(&self, prompt: &str, schema: &Value) -> PlantResult<String>;
}

#[derive(Clone)]
pub struct Assistant {
    model: Arc<dyn GenerativeClient>,
}

impl Assistant {
    pub fn new(model: Arc<dyn GenerativeClient>) -> Self {
        Self { model }
    }

    pub async fn suggest_priority(&self, order: &ProductionOrder) -> PlantResult<PrioritySuggestion> {
        debug!(no_ot = ?order.no_ot, "requesting priority suggestion");
        let raw = self
            .model
            .generate_json(&prompts::priority(order), &prompts::priority_schema())
            .await?;
        serde_json::from_str(raw.trim()).map_err(|e| {
            error!(error = %e, "model returned invalid JSON");
            PlantError::Assistant(INVALID_JSON_MESSAGE.to_string())
        })
    }

    pub async fn draft_client_email(&self, order: &ProductionOrder) -> PlantResult<String> {
        debug!(no_ot = ?order.no_ot, "drafting client email");
        self.model.generate_text(&prompts::client_email(order)).await
    }

    pub async fn generate_job_description(&self, cargo: &str) -> PlantResult<String> {
        if cargo.trim().is_empty() {
            return Err(PlantError::Validation("cargo must not be empty".to_string()));
        }
        debug!(cargo, "generating job description");
        self.model.generate_text(&prompts::job_description(cargo)).await
    }
}
