//! Fuelops CLI - dispatch console for fuel deliveries.
//!
//! # Usage
//!
//! ```bash
//! # Log in with FUELOPS_EMAIL / FUELOPS_PASSWORD
//! fuelops login
//!
//! # Check an order file, then import it
//! fuelops import orders orders.xlsx --dry-run
//! fuelops import orders orders.xlsx
//!
//! # Plan a trip from two sales orders
//! fuelops trips trucks 4500012 4500013
//! fuelops trips create -v 12345-A-6 -d 2024-05-02 4500012 4500013
//!
//! # Confirm loading and print the documents
//! fuelops loading confirm 12 --first-seal 0101
//! fuelops documents generate invoice 12
//!
//! # End of day
//! fuelops reports daily 2024-05-02
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami` - Session management
//! - `import` / `import-history` - Spreadsheet imports
//! - `orders` - Sales order lines
//! - `trips` - Trip planning
//! - `loading` - Loading confirmation and seals
//! - `documents` - Invoices, delivery notes and loading slips
//! - `reports` - CSV and XLSX exports
//! - `dashboard` - Headline counters

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fuelops_admin::AppContext;
use fuelops_admin::config::AdminConfig;
use fuelops_admin::documents::{DocumentKind, ServerDocument};
use fuelops_core::{ImportKind, OrderId, OrderRegime, OrderStatus, TripId, TripStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use error::CliError;

#[derive(Parser)]
#[command(name = "fuelops")]
#[command(author, version, about = "Fuel delivery dispatch console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email (defaults to `FUELOPS_EMAIL`)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account; the password is read from `FUELOPS_PASSWORD`
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Import a CSV or Excel file
    Import {
        /// Entity type (clients, products, tanks, trucks, plants, prices, orders)
        kind: ImportKind,
        /// File to import (.csv, .xlsx or .xls)
        file: PathBuf,
        /// Parse and validate without sending anything
        #[arg(long)]
        dry_run: bool,
        /// Rows per request (defaults to `FUELOPS_IMPORT_BATCH_SIZE`)
        #[arg(short, long)]
        batch_size: Option<usize>,
    },
    /// List past imports
    ImportHistory {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Manage sales order lines
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Plan delivery trips
    Trips {
        #[command(subcommand)]
        action: TripsAction,
    },
    /// Confirm truck loading
    Loading {
        #[command(subcommand)]
        action: LoadingAction,
    },
    /// Generate delivery documents
    Documents {
        #[command(subcommand)]
        action: DocumentsAction,
    },
    /// Export reports
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
    /// Show headline counters
    Dashboard,
}

/// How `orders list` groups lines.
#[derive(Clone, Copy, ValueEnum)]
enum Grouping {
    /// One row per line item
    None,
    /// One row per sales order
    SalesOrder,
    /// One row per trip
    Trip,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List order lines
    List {
        #[arg(short, long)]
        status: Option<OrderStatus>,
        /// First requested delivery date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last requested delivery date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(short, long)]
        trip: Option<String>,
        #[arg(short, long, value_enum, default_value = "none")]
        group_by: Grouping,
    },
    /// Create a sales order with one or more lines
    Create {
        /// Sales order number (defaults to the next free number)
        #[arg(long)]
        sales_order: Option<String>,
        #[arg(short, long)]
        customer: String,
        /// Ship-to party (defaults to the customer)
        #[arg(long)]
        ship_to: Option<String>,
        #[arg(short, long)]
        plant: String,
        /// Requested delivery date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// VRAC or PACK
        #[arg(short, long, default_value = "VRAC")]
        regime: OrderRegime,
        /// SAP order type, e.g. ZCON for depot transfers
        #[arg(long)]
        order_type: Option<String>,
        /// Line as MATERIAL=QUANTITY; repeat for more lines
        #[arg(short, long = "line", required = true, value_parser = commands::orders::parse_line)]
        lines: Vec<(String, f64)>,
    },
    /// Set the status of one or more order lines
    Status {
        #[arg(short, long)]
        status: OrderStatus,
        #[arg(required = true)]
        ids: Vec<OrderId>,
    },
    /// Delete order lines
    Delete {
        #[arg(required = true)]
        ids: Vec<OrderId>,
    },
    /// Print the next free sales order number
    Next,
}

#[derive(Subcommand)]
enum TripsAction {
    /// List trips
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one trip with its lines
    Show { trip: TripId },
    /// Sales orders not yet on a trip
    Candidates,
    /// Trucks able to carry the given sales orders
    Trucks {
        #[arg(required = true)]
        sales_orders: Vec<String>,
    },
    /// Create a trip from whole sales orders
    Create {
        /// Truck registration
        #[arg(short, long)]
        vehicle: String,
        /// Tour start date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Driver (defaults to the truck's driver)
        #[arg(long)]
        driver: Option<String>,
        /// Driver national ID (defaults to the truck's)
        #[arg(long)]
        cin: Option<String>,
        #[arg(required = true)]
        sales_orders: Vec<String>,
    },
    /// Add an order line to a trip
    Assign { trip: TripId, order: OrderId },
    /// Take an order line off a trip
    Remove { trip: TripId, order: OrderId },
    /// Set the status of a trip
    Status { trip: TripId, status: TripStatus },
    /// Delete a trip
    Delete { trip: TripId },
}

#[derive(Subcommand)]
enum LoadingAction {
    /// Confirm loading; bulk trips need the first seal number
    Confirm {
        trip: TripId,
        #[arg(short, long)]
        first_seal: Option<String>,
    },
    /// Show truck compartments and the seals they would receive
    Compartments {
        trip: TripId,
        #[arg(short, long)]
        first_seal: Option<String>,
    },
    /// Confirm loading with explicit seals per compartment
    Seals {
        trip: TripId,
        /// Seal as COMPARTMENT=NUMBER, e.g. Comp1=0101
        #[arg(required = true, value_parser = commands::loading::parse_seal)]
        seals: Vec<(String, String)>,
    },
}

/// Backend-rendered documents.
#[derive(Clone, Copy, ValueEnum)]
enum ServerKind {
    Invoice,
    DeliveryNote,
}

impl From<ServerKind> for ServerDocument {
    fn from(kind: ServerKind) -> Self {
        match kind {
            ServerKind::Invoice => Self::Invoice,
            ServerKind::DeliveryNote => Self::DeliveryNote,
        }
    }
}

#[derive(Subcommand)]
enum DocumentsAction {
    /// Render PDFs for a trip (invoice, delivery-note, loading-slip)
    Generate {
        kind: DocumentKind,
        trip: TripId,
        /// Output directory (defaults to `FUELOPS_OUTPUT_DIR`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download a PDF rendered by the backend for one order
    Download {
        #[arg(value_enum)]
        kind: ServerKind,
        order: OrderId,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ReportsAction {
    /// Orders of one delivery day as CSV
    Daily {
        /// Delivery date (defaults to today)
        date: Option<NaiveDate>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Completed orders over a date range as XLSX
    Completed {
        start: NaiveDate,
        end: NaiveDate,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration decides the log format, so load it first
    let config = AdminConfig::from_env();
    init_tracing(config.as_ref().is_ok_and(|c| c.log_json));

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::from(fuelops_admin::AppError::from(e))),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        if e.requires_login() {
            tracing::warn!("Session expired. Run `fuelops login` again.");
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output can be piped.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fuelops_admin=info,fuelops_cli=info".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli, config: AdminConfig) -> Result<(), CliError> {
    let ctx = AppContext::from_config(config)?;

    match cli.command {
        Commands::Login { email } => commands::auth::login(&ctx, email).await?,
        Commands::Register { username, email } => {
            commands::auth::register(&ctx, &username, &email).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Import {
            kind,
            file,
            dry_run,
            batch_size,
        } => {
            if dry_run {
                commands::import::dry_run(&ctx, kind, &file).await?;
            } else {
                commands::import::run(&ctx, kind, &file, batch_size).await?;
            }
        }
        Commands::ImportHistory { page, limit } => {
            commands::import::history(&ctx, page, limit).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List {
                status,
                start,
                end,
                trip,
                group_by,
            } => {
                let filter = fuelops_admin::api::OrderFilter {
                    status,
                    start_date: start,
                    end_date: end,
                    trip_num: trip,
                    date: None,
                };
                commands::orders::list(&ctx, &filter, group_by).await?;
            }
            OrdersAction::Create {
                sales_order,
                customer,
                ship_to,
                plant,
                date,
                regime,
                order_type,
                lines,
            } => {
                let header = commands::orders::NewOrder {
                    sales_order,
                    customer,
                    ship_to,
                    plant,
                    date,
                    regime,
                    order_type,
                };
                commands::orders::create(&ctx, header, &lines).await?;
            }
            OrdersAction::Status { status, ids } => {
                commands::orders::set_status(&ctx, &ids, status).await?;
            }
            OrdersAction::Delete { ids } => commands::orders::delete(&ctx, &ids).await?,
            OrdersAction::Next => commands::orders::next(&ctx).await?,
        },
        Commands::Trips { action } => match action {
            TripsAction::List { page, limit } => commands::trips::list(&ctx, page, limit).await?,
            TripsAction::Show { trip } => commands::trips::show(&ctx, trip).await?,
            TripsAction::Candidates => commands::trips::candidates(&ctx).await?,
            TripsAction::Trucks { sales_orders } => {
                commands::trips::trucks(&ctx, &sales_orders).await?;
            }
            TripsAction::Create {
                vehicle,
                date,
                driver,
                cin,
                sales_orders,
            } => {
                let details = fuelops_admin::planning::TripDetails {
                    tour_start_date: Some(date),
                    driver_name: driver,
                    driver_cin: cin,
                };
                commands::trips::create(&ctx, &vehicle, details, &sales_orders).await?;
            }
            TripsAction::Assign { trip, order } => {
                commands::trips::assign(&ctx, trip, order).await?;
            }
            TripsAction::Remove { trip, order } => {
                commands::trips::remove(&ctx, trip, order).await?;
            }
            TripsAction::Status { trip, status } => {
                commands::trips::set_status(&ctx, trip, status).await?;
            }
            TripsAction::Delete { trip } => commands::trips::delete(&ctx, trip).await?,
        },
        Commands::Loading { action } => match action {
            LoadingAction::Confirm { trip, first_seal } => {
                commands::loading::confirm(&ctx, trip, first_seal.as_deref()).await?;
            }
            LoadingAction::Compartments { trip, first_seal } => {
                commands::loading::compartments(&ctx, trip, first_seal.as_deref()).await?;
            }
            LoadingAction::Seals { trip, seals } => {
                commands::loading::seals(&ctx, trip, seals).await?;
            }
        },
        Commands::Documents { action } => match action {
            DocumentsAction::Generate { kind, trip, output } => {
                commands::documents::generate(&ctx, kind, trip, output).await?;
            }
            DocumentsAction::Download {
                kind,
                order,
                output,
            } => {
                commands::documents::download(&ctx, kind.into(), order, output).await?;
            }
        },
        Commands::Reports { action } => match action {
            ReportsAction::Daily { date, output } => {
                commands::reports::daily(&ctx, date, output).await?;
            }
            ReportsAction::Completed { start, end, output } => {
                commands::reports::completed(&ctx, start, end, output).await?;
            }
        },
        Commands::Dashboard => commands::reports::dashboard(&ctx).await?,
    }
    Ok(())
}
