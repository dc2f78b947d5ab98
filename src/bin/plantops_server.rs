//! Plantops API Server binary
//!
//! HTTP JSON API over the plant's spreadsheet.

use clap::Parser;
use plantops::api::{
    run_api_server,
    server::{ApiConfig, AppState},
};
use plantops::cli::ConnectionArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plantops-server")]
#[command(version)]
#[command(about = "Plantops API Server - HTTP JSON API over the plant's spreadsheet")]
#[command(long_about = r#"
Plantops API Server - HTTP JSON API

Sheet endpoints (sheet = orders, products, clients, staff, machines,
maintenance, raw-materials, quality):
  - GET  /api/v1/sheets/:sheet          - List records
  - POST /api/v1/sheets/:sheet          - Append a record
  - GET  /api/v1/sheets/:sheet/headers  - Column mapping

Orders and products:
  - GET  /api/v1/dashboard              - Orders with KPIs
  - GET  /api/v1/kpis                   - Completion KPIs
  - GET  /api/v1/order-form             - Clients and products for a new order
  - GET  /api/v1/orders/:no_ot          - Order detail with elapsed time
  - GET  /api/v1/products/search?q=     - Product search
  - PUT  /api/v1/products/:codigo       - Edit a product

Assistant (needs GEMINI_API_KEY):
  - POST /api/v1/orders/:no_ot/priority
  - POST /api/v1/orders/:no_ot/email
  - POST /api/v1/staff/job-description  - Body: {"cargo": "..."}

Example usage:
  PLANTOPS_ENDPOINT=https://script.google.com/macros/s/ID/exec plantops-server
  plantops-server --host 0.0.0.0 --port 3000 -c plantops.yaml

  curl http://localhost:8080/api/v1/sheets/orders
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "PLANTOPS_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PLANTOPS_PORT")]
    port: u16,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plantops=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let settings = args.connection.resolve()?;
    let client = settings.plant_client()?;
    let assistant = match settings.assistant() {
        Ok(assistant) => Some(assistant),
        Err(e) => {
            tracing::warn!("assistant endpoints disabled: {}", e);
            None
        }
    };

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, AppState::new(client, assistant)).await
}
