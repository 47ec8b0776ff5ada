//! Storeroom CLI - Inventory queries and variant maintenance.
//!
//! # Usage
//!
//! ```bash
//! # First page of the inventory table
//! storeroom inventory list
//!
//! # Low-stock shirts, second page, sorted by stock descending
//! storeroom inventory list --name shirt --status "low stock" --page 2 --sort stock --desc
//!
//! # Everything with 5 to 20 units in stock, as JSON
//! storeroom inventory export --min-stock 5 --max-stock 20 -o stock.json
//!
//! # Product picker search
//! storeroom products search linen
//!
//! # Merge two variants into a third, checking for shared suppliers first
//! storeroom variant merge TS-01-RED TS-01-RD TS-01-R
//!
//! # Import a POS sales export
//! storeroom inventory upload sales-2026-03.xlsx
//! ```
//!
//! # Commands
//!
//! - `inventory list|export|upload` - Filtered inventory pages, full exports, POS imports
//! - `products search` - Product options by name
//! - `variant show|create|update|delete|merge|adjust|history` - Single-variant operations
//!
//! # Environment Variables
//!
//! See `storeroom_client::config` for the `STOREROOM_*` API settings.
//!
//! - `RUST_LOG` - Log filter (default: `storeroom_client=info,storeroom_cli=info`)
//! - `STOREROOM_LOG_FORMAT` - `json` for structured logs, text otherwise
//! - `SENTRY_DSN` - Sentry error tracking DSN (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use storeroom_core::{FilterForm, Sort, SortKey};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "storeroom")]
#[command(author, version, about = "Storeroom inventory tools")]
struct Cli {
    /// API base URL (overrides `STOREROOM_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the inventory table
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Search products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect and maintain a single variant
    Variant {
        #[command(subcommand)]
        action: VariantAction,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// Show one page of inventory
    List {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Print the page as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Bypass cached responses
        #[arg(long)]
        refresh: bool,
    },
    /// Write every matching record as JSON
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a POS sales export (.xlsx) for import
    Upload {
        /// Excel file to upload
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Find products by name, one line per product
    Search {
        /// Product name or part of it
        name: String,
    },
}

#[derive(Subcommand)]
enum VariantAction {
    /// Show a variant with its suppliers
    Show {
        /// Variant code
        code: String,
    },
    /// Create a variant, or a new product with `--new-product`
    Create {
        /// Product code the variant belongs to
        product_id: String,

        /// Product name
        #[arg(long)]
        name: String,

        /// Option label, e.g. "Red / M"
        #[arg(long)]
        option: String,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        price: Option<Decimal>,

        #[arg(long)]
        min_stock: Option<i64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        memo: Option<String>,

        /// Register the product itself along with this first variant
        #[arg(long)]
        new_product: bool,
    },
    /// Change variant fields; only the flags given are sent
    Update {
        /// Variant code
        code: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        option: Option<String>,

        #[arg(long)]
        price: Option<Decimal>,

        #[arg(long)]
        min_stock: Option<i64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        memo: Option<String>,
    },
    /// Delete a variant
    Delete {
        /// Variant code
        code: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Merge source variants into a target variant
    Merge {
        /// Variant that remains after the merge
        target: String,

        /// Variants folded into the target
        #[arg(required = true, num_args = 1..)]
        sources: Vec<String>,

        /// Merge even if target and sources share suppliers
        #[arg(long)]
        force: bool,
    },
    /// Record a physical stock count
    Adjust {
        /// Variant code
        code: String,

        /// Counted stock
        #[arg(long)]
        actual_stock: i64,

        /// Reason for the adjustment
        #[arg(long)]
        reason: String,

        /// Who counted
        #[arg(long)]
        updated_by: String,
    },
    /// Show stock adjustment history
    History {
        /// Limit to one variant
        code: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

/// Inventory filter flags, named as in the inventory screen.
#[derive(Args)]
struct FilterArgs {
    /// Name contains (case-insensitive)
    #[arg(long)]
    name: Option<String>,

    /// Exact category
    #[arg(long)]
    category: Option<String>,

    /// Stock status: normal, "low stock", "sold out" or all
    #[arg(long)]
    status: Option<String>,

    /// Minimum stock (inclusive)
    #[arg(long)]
    min_stock: Option<i64>,

    /// Maximum stock (inclusive)
    #[arg(long)]
    max_stock: Option<i64>,

    /// Minimum sales (inclusive)
    #[arg(long)]
    min_sales: Option<Decimal>,

    /// Maximum sales (inclusive)
    #[arg(long)]
    max_sales: Option<Decimal>,
}

impl From<FilterArgs> for FilterForm {
    fn from(args: FilterArgs) -> Self {
        Self {
            name: args.name,
            category: args.category,
            status: args.status,
            min_stock: args.min_stock,
            max_stock: args.max_stock,
            min_sales: args.min_sales,
            max_sales: args.max_sales,
        }
    }
}

#[derive(Args)]
struct SortArgs {
    /// Sort column: product_id, variant_code, name, price, stock or sales
    #[arg(long)]
    sort: Option<SortKey>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,
}

impl SortArgs {
    fn to_sort(&self) -> Option<Sort> {
        self.sort.map(|key| {
            if self.desc {
                Sort::descending(key)
            } else {
                Sort::ascending(key)
            }
        })
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storeroom_client=info,storeroom_cli=info".into());

    let is_json = std::env::var("STOREROOM_LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // process::exit skips destructors, so flush Sentry first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Inventory { action } => match action {
            InventoryAction::List {
                filters,
                sort,
                page,
                json,
                refresh,
            } => {
                commands::inventory::list(&ctx, filters.into(), sort.to_sort(), page, json, refresh)
                    .await?;
            }
            InventoryAction::Export {
                filters,
                sort,
                output,
            } => {
                commands::inventory::export(&ctx, filters.into(), sort.to_sort(), output.as_deref())
                    .await?;
            }
            InventoryAction::Upload { file } => commands::inventory::upload(&ctx, &file).await?,
        },
        Commands::Products { action } => match action {
            ProductsAction::Search { name } => commands::products::search(&ctx, &name).await?,
        },
        Commands::Variant { action } => match action {
            VariantAction::Show { code } => commands::variant::show(&ctx, &code).await?,
            VariantAction::Create {
                product_id,
                name,
                option,
                category,
                price,
                min_stock,
                description,
                memo,
                new_product,
            } => {
                let variant = storeroom_core::NewVariant {
                    product_id: storeroom_core::ProductCode::new(product_id),
                    name,
                    option,
                    category,
                    price,
                    min_stock,
                    description,
                    memo,
                };
                commands::variant::create(&ctx, variant, new_product).await?;
            }
            VariantAction::Update {
                code,
                name,
                option,
                price,
                min_stock,
                description,
                memo,
            } => {
                let update = storeroom_core::VariantUpdate {
                    name,
                    option,
                    price,
                    min_stock,
                    description,
                    memo,
                };
                commands::variant::update(&ctx, &code, update).await?;
            }
            VariantAction::Delete { code, yes } => commands::variant::delete(&ctx, &code, yes).await?,
            VariantAction::Merge {
                target,
                sources,
                force,
            } => commands::variant::merge(&ctx, &target, &sources, force).await?,
            VariantAction::Adjust {
                code,
                actual_stock,
                reason,
                updated_by,
            } => {
                let request = storeroom_core::StockAdjustmentRequest {
                    actual_stock,
                    reason,
                    updated_by,
                };
                commands::variant::adjust(&ctx, &code, request).await?;
            }
            VariantAction::History { code, page } => {
                commands::variant::history(&ctx, code.as_deref(), page).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filtered_list() {
        let cli = Cli::try_parse_from([
            "storeroom",
            "inventory",
            "list",
            "--status",
            "low stock",
            "--min-stock",
            "5",
            "--max-sales",
            "1000.50",
            "--sort",
            "stock",
            "--desc",
            "-p",
            "2",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::Inventory {
            action: InventoryAction::List {
                filters, sort, page, ..
            },
        } = cli.command
        else {
            panic!("expected inventory list");
        };
        assert_eq!(page, 2);
        assert_eq!(sort.to_sort(), Some(Sort::descending(SortKey::Stock)));

        let form = FilterForm::from(filters);
        assert_eq!(form.status.as_deref(), Some("low stock"));
        assert_eq!(form.min_stock, Some(5));
        assert_eq!(form.max_sales, Some(Decimal::new(100_050, 2)));
    }

    #[test]
    fn test_merge_requires_sources() {
        assert!(Cli::try_parse_from(["storeroom", "variant", "merge", "T-1"]).is_err());
    }

    #[test]
    fn test_parse_create_new_product() {
        let cli = Cli::try_parse_from([
            "storeroom",
            "variant",
            "create",
            "TS-02",
            "--name",
            "Oxford shirt",
            "--option",
            "Blue / L",
            "--price",
            "39.90",
            "--new-product",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::Variant {
            action:
                VariantAction::Create {
                    product_id,
                    option,
                    price,
                    category,
                    new_product,
                    ..
                },
        } = cli.command
        else {
            panic!("expected variant create");
        };
        assert_eq!(product_id, "TS-02");
        assert_eq!(option, "Blue / L");
        assert_eq!(price, Some(Decimal::new(3_990, 2)));
        assert_eq!(category, None);
        assert!(new_product);
    }

    #[test]
    fn test_create_requires_option() {
        assert!(
            Cli::try_parse_from(["storeroom", "variant", "create", "TS-02", "--name", "Shirt"])
                .is_err()
        );
    }

    #[test]
    fn test_upload_requires_file() {
        assert!(Cli::try_parse_from(["storeroom", "inventory", "upload"]).is_err());
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["storeroom", "inventory", "list", "--desc"]).is_err());
    }
}
