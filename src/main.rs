use anyhow::Result;
use chrono::Local;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

use brand_ppi::{
    document::DEFAULT_GEOGRAPHY, table::REPORT_METADATA_ROWS, Currency, Inputs, RunMeta,
};

/// Converts sales and inventory report exports into brand PPI, sell-through
/// and revenue data for the CRM dashboard.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Inventory receive costing report (CSV)
    #[arg(long)]
    inventory: PathBuf,
    /// Detailed sales breakdown report (CSV); may be given more than once
    #[arg(long, required = true)]
    sales: Vec<PathBuf>,
    /// Table mapping vendor names to canonical brand names (CSV)
    #[arg(long, visible_alias = "vendor_map")]
    vendor_map: Option<PathBuf>,
    /// Where to write the JSON document
    #[arg(long)]
    output: PathBuf,
    /// Free-text notes for the document
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long, default_value = DEFAULT_GEOGRAPHY)]
    geography: String,
    /// Three-letter currency code
    #[arg(long, default_value_t = Currency::USD)]
    currency: Currency,
    /// Metadata rows above the column header in the reports
    #[arg(long, default_value_t = REPORT_METADATA_ROWS)]
    skip_rows: usize,
    /// Log more detail (-v for progress, -vv for per-file counts)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let inputs = Inputs {
        inventory: args.inventory,
        sales: args.sales,
        vendor_map: args.vendor_map,
        skip_rows: args.skip_rows,
        meta: RunMeta {
            notes: args.notes,
            geography: args.geography,
            currency: args.currency,
        },
    };
    let run = brand_ppi::run(&inputs, Local::now().date_naive());
    run.document.write_json(&args.output)?;
    println!(
        "Wrote {} brands to {}",
        run.document.brands.len(),
        args.output.display()
    );
    Ok(())
}
