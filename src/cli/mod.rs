//! CLI command handlers

pub mod commands;

pub use commands::{
    create, draft_email, headers, job_description, kpi, list, order_detail, parse_fields,
    search_products, suggest_priority, update_product,
};

use std::path::PathBuf;

use clap::Args;

use crate::config::{Config, Overrides};
use crate::error::PlantResult;
use crate::gateway::WriteMode;

/// Connection settings shared by the `plantops` and `plantops-server` binaries
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// YAML config file
    #[arg(short, long, env = "PLANTOPS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Spreadsheet web-app endpoint URL
    #[arg(short, long, env = "PLANTOPS_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// confirmed: check the script's answer; opaque: send and assume success
    #[arg(long, value_enum, env = "PLANTOPS_WRITE_MODE", global = true)]
    pub write_mode: Option<WriteMode>,

    /// Gemini API key for the assistant commands
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "PLANTOPS_MODEL", global = true)]
    pub model: Option<String>,
}

impl ConnectionArgs {
    pub fn resolve(&self) -> PlantResult<Config> {
        Config::resolve(
            self.config.as_deref(),
            Overrides {
                endpoint: self.endpoint.clone(),
                write_mode: self.write_mode,
                api_key: self.api_key.clone(),
                model: self.model.clone(),
            },
        )
    }
}
