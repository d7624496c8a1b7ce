use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use kpi_engine::dataset;
use kpi_engine::precompute::{load_cumulative_csv, precompute};

#[derive(Parser)]
#[command(name = "precompute")]
#[command(about = "Derive daily KPI metrics from the cumulative plan/actual table")]
struct Args {
    /// Raw KPI table (cumulative Plan/Actual per date)
    #[arg(short, long, default_value = "data/kpi_raw.csv")]
    input: PathBuf,

    /// Where to write the precomputed table
    #[arg(short, long, default_value = "data/kpi_precomputed.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    println!("Reading raw KPI file from {}...", args.input.display());
    let rows = load_cumulative_csv(&args.input)?;

    println!("Precomputing daily KPI metrics for {} rows...", rows.len());
    let records = precompute(rows);

    dataset::write_csv(&args.output, &records)?;
    println!("Saved precomputed data to {}", args.output.display());

    Ok(())
}
