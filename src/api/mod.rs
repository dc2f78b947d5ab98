//! Plantops API Server module
//!
//! HTTP JSON API in front of the spreadsheet, speaking internal field names.
//! Run with `plantops-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};
