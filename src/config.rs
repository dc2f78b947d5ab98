//! Runtime configuration
//!
//! Values come from an optional YAML file and are then overridden by command
//! line arguments and environment variables (clap resolves those two).
//!
//! ```yaml
//! endpoint: https://script.google.com/macros/s/<deployment>/exec
//! write_mode: confirmed   # or: opaque
//! timeout_secs: 30
//! assistant:
//!   model: gemini-2.5-flash
//!   base_url: https://generativelanguage.googleapis.com
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assistant::{Assistant, GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::client::PlantClient;
use crate::error::{PlantError, PlantResult};
use crate::gateway::{HttpSheetBackend, WriteMode};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    pub model: String,
    pub base_url: String,
    /// Usually left out of the file and supplied through `GEMINI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub endpoint: Option<String>,
    pub write_mode: WriteMode,
    pub timeout_secs: u64,
    pub assistant: AssistantConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            write_mode: WriteMode::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            assistant: AssistantConfig::default(),
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub write_mode: Option<WriteMode>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> PlantResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// File config (or defaults) with overrides applied
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> PlantResult<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlantResult<()> {
        if self.timeout_secs == 0 {
            return Err(PlantError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = Some(endpoint);
        }
        if let Some(mode) = overrides.write_mode {
            self.write_mode = mode;
        }
        if let Some(key) = overrides.api_key {
            self.assistant.api_key = Some(key);
        }
        if let Some(model) = overrides.model {
            self.assistant.model = model;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn plant_client(&self) -> PlantResult<PlantClient> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            PlantError::Config(
                "no spreadsheet endpoint configured (use --endpoint or PLANTOPS_ENDPOINT)"
                    .to_string(),
            )
        })?;
        let backend = HttpSheetBackend::new(endpoint, self.write_mode, self.timeout())?;
        Ok(PlantClient::new(Arc::new(backend)))
    }

    pub fn assistant(&self) -> PlantResult<Assistant> {
        let key = self.assistant.api_key.as_deref().unwrap_or_default();
        let model = GeminiClient::new(
            key,
            self.assistant.model.clone(),
            self.assistant.base_url.clone(),
            self.timeout(),
        )?;
        Ok(Assistant::new(Arc::new(model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.write_mode, WriteMode::Confirmed);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.assistant.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpoint: https://script.example.com/exec").unwrap();
        writeln!(file, "write_mode: opaque").unwrap();
        writeln!(file, "assistant:\n  model: gemini-2.0-pro").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://script.example.com/exec")
        );
        assert_eq!(config.write_mode, WriteMode::Opaque);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.assistant.model, "gemini-2.0-pro");
        assert_eq!(config.assistant.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpont: typo").unwrap();
        assert!(matches!(Config::load(file.path()), Err(PlantError::Yaml(_))));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: 0").unwrap();

        let err = Config::load(file.path()).unwrap_err();

        assert!(matches!(err, PlantError::Config(_)));
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::load(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(PlantError::Io(_))));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config {
            endpoint: Some("https://file.example.com".into()),
            ..Default::default()
        };
        config.apply(Overrides {
            endpoint: Some("https://cli.example.com".into()),
            write_mode: Some(WriteMode::Opaque),
            api_key: Some("k".into()),
            model: None,
        });
        assert_eq!(config.endpoint.as_deref(), Some("https://cli.example.com"));
        assert_eq!(config.write_mode, WriteMode::Opaque);
        assert_eq!(config.assistant.api_key.as_deref(), Some("k"));
        assert_eq!(config.assistant.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_plant_client_requires_endpoint() {
        let result = Config::default().plant_client();
        assert!(matches!(result, Err(PlantError::Config(_))));
    }

    #[test]
    fn test_assistant_requires_key() {
        assert!(Config::default().assistant().is_err());
        let mut config = Config::default();
        config.assistant.api_key = Some("abc".into());
        assert!(config.assistant().is_ok());
    }
}
