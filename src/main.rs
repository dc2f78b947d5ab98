use clap::{Parser, Subcommand};
use colored::Colorize;
use plantops::cli::{self, ConnectionArgs};
use plantops::error::PlantResult;
use plantops::mapping::Sheet;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plantops")]
#[command(about = "Manufacturing operations over a spreadsheet-backed store")]
#[command(long_about = "Plantops - production orders, products, staff, clients, machines,
maintenance, raw materials and quality control, kept in a spreadsheet.

COMMANDS:
  list             - Show every row of a sheet
  create           - Append a row to a sheet
  update-product   - Edit a product in place
  search-products  - Find products by name or code
  kpi              - Order completion KPIs
  order            - Details and elapsed time for one order
  suggest-priority - AI priority suggestion for an order
  draft-email      - AI status email for an order's client
  job-description  - AI job description for a position
  headers          - Show a sheet's column mapping

SHEETS:
  orders, products, clients, staff, machines, maintenance,
  raw-materials, quality (or their spreadsheet names: ordenes, productos, ...)

EXAMPLES:
  plantops list orders
  plantops create staff -f nombre=\"Ana Ruiz\" -f cedula=1020 -f cargo=Soldadora
  plantops update-product BIS-010 -f acabado=Cromado
  plantops suggest-priority 1024

Set PLANTOPS_ENDPOINT to the web-app URL and GEMINI_API_KEY for the AI commands.")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every row of a sheet
    List {
        /// Sheet name or alias (orders, products, ...)
        sheet: Sheet,
    },

    #[command(long_about = "Append a row to a sheet.

Fields use the internal names shown by 'plantops headers <sheet>'.
Fields the sheet has no column for are reported and not sent.

EXAMPLE:
  plantops create orders -f no_ot=1025 -f cliente=Ruiz -f prioridad=Alta")]
    /// Append a row to a sheet
    Create {
        /// Sheet name or alias
        sheet: Sheet,

        /// field=value pairs
        #[arg(short, long = "field", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Edit a product in place, identified by its code
    UpdateProduct {
        /// Product code (CÓDIGO)
        codigo: String,

        /// field=value pairs to overwrite
        #[arg(short, long = "field", value_name = "FIELD=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Find products by name or code
    SearchProducts {
        /// Text to look for (case-insensitive)
        term: String,
    },

    /// Order completion KPIs
    Kpi,

    /// Details and elapsed time for one order
    Order {
        /// Order number (No. OT)
        no_ot: String,
    },

    /// AI priority suggestion for an order
    SuggestPriority {
        /// Order number (No. OT)
        no_ot: String,
    },

    /// AI status email for an order's client
    DraftEmail {
        /// Order number (No. OT)
        no_ot: String,
    },

    /// AI job description for a position
    JobDescription {
        /// Position name (cargo)
        cargo: String,
    },

    /// Show a sheet's column mapping
    Headers {
        /// Sheet name or alias
        sheet: Sheet,
    },
}

async fn run(cli: Cli) -> PlantResult<()> {
    let json = cli.json;
    if let Commands::Headers { sheet } = cli.command {
        return cli::headers(sheet);
    }

    let config = cli.connection.resolve()?;
    if let Commands::JobDescription { cargo } = &cli.command {
        return cli::job_description(&config.assistant()?, cargo).await;
    }

    let client = config.plant_client()?;
    match cli.command {
        Commands::List { sheet } => cli::list(&client, sheet, json).await,
        Commands::Create { sheet, fields } => cli::create(&client, sheet, &fields).await,
        Commands::UpdateProduct { codigo, fields } => {
            cli::update_product(&client, &codigo, &fields).await
        }
        Commands::SearchProducts { term } => cli::search_products(&client, &term, json).await,
        Commands::Kpi => cli::kpi(&client, json).await,
        Commands::Order { no_ot } => cli::order_detail(&client, &no_ot, json).await,
        Commands::SuggestPriority { no_ot } => {
            cli::suggest_priority(&client, &config.assistant()?, &no_ot, json).await
        }
        Commands::DraftEmail { no_ot } => {
            cli::draft_email(&client, &config.assistant()?, &no_ot).await
        }
        Commands::JobDescription { .. } | Commands::Headers { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "plantops=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "❌".red(), e.to_string().red());
        std::process::exit(1);
    }
}
