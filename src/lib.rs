//! Plantops - manufacturing operations over a spreadsheet-backed store
//!
//! Production orders, products, clients, staff, machines, maintenance, raw
//! materials and quality records live as rows in the tabs of a spreadsheet,
//! served by a web-app endpoint. This library maps those rows to typed records
//! and back, performs the fetch/post round-trips, and drafts text with a
//! generative model.
//!
//! # Features
//!
//! - Bidirectional column mapping (spreadsheet headers ⇄ field names)
//! - Typed entities tolerant of loosely typed cells
//! - HTTP gateway with confirmed or response-blind writes
//! - Order KPIs and elapsed-time tracking
//! - AI priority suggestions, client emails and job descriptions
//!
//! # Example
//!
//! ```no_run
//! use plantops::config::{Config, Overrides};
//!
//! # async fn run() -> plantops::PlantResult<()> {
//! let config = Config::resolve(
//!     None,
//!     Overrides {
//!         endpoint: Some("https://script.google.com/macros/s/ID/exec".into()),
//!         ..Default::default()
//!     },
//! )?;
//! let client = config.plant_client()?;
//!
//! let kpis = client.fetch_kpis().await?;
//! println!("{} of {} orders completed", kpis.ordenes_completadas, kpis.total_ordenes);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod assistant;
pub mod cli;
pub mod client;
pub mod config;
pub mod dates;
pub mod error;
pub mod gateway;
pub mod mapping;
pub mod types;

// Re-export commonly used types
pub use client::PlantClient;
pub use error::{PlantError, PlantResult};
pub use mapping::{ColumnMapping, Sheet};
pub use types::{
    Client, KpiData, Machine, Maintenance, Product, ProductionOrder, QualityRecord, RawMaterial,
    Record, Row, Staff,
};
