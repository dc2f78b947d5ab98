//! Gemini `generateContent` REST client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::GenerativeClient;
use crate::error::{PlantError, PlantResult};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> PlantResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PlantError::Config(
                "Gemini API key is empty (set GEMINI_API_KEY)".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(&self, body: Value) -> PlantResult<String> {
        debug!(model = %self.model, "calling generateContent");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload: Value = response.json().await.unwrap_or(Value::Null);
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            warn!(status = status.as_u16(), %message, "generateContent failed");
            return Err(PlantError::Assistant(format!(
                "{} ({})",
                message,
                status.as_u16()
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateResponse) -> PlantResult<String> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| PlantError::Assistant("model returned no candidates".to_string()))?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    Ok(text)
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> PlantResult<String> {
        self.generate(json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        }))
        .await
    }

    async fn generate_json(&self, prompt: &str, schema: &Value) -> PlantResult<String> {
        self.generate(json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        }))
        .await
    }
}
