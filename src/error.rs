use thiserror::Error;

pub type PlantResult<T> = Result<T, PlantError>;

/// Message shown when the spreadsheet endpoint answers with a non-OK status.
pub const CONNECTION_MESSAGE: &str = "Error al conectar con la API de Google Sheets.";

/// Message used when a confirmed write fails without an explanation.
pub const DEFAULT_WRITE_MESSAGE: &str = "Error en la respuesta del servidor";

#[derive(Error, Debug)]
pub enum PlantError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint reachable but answered with a non-OK status.
    #[error("{}", CONNECTION_MESSAGE)]
    Connection { status: u16 },

    /// Error reported by the spreadsheet script itself.
    #[error("{0}")]
    Backend(String),

    #[error("Unexpected payload from sheet '{sheet}': {detail}")]
    UnexpectedPayload { sheet: String, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Assistant error: {0}")]
    Assistant(String),
}

impl PlantError {
    /// True for failures that happened before any answer came back from a remote.
    pub fn is_transport(&self) -> bool {
        matches!(self, PlantError::Http(_) | PlantError::Connection { .. })
    }
}
