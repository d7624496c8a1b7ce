use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use kpi_engine::assistant::KpiAssistant;
use kpi_engine::dataset::KpiDataset;
use kpi_engine::llm::LlmClient;

#[derive(Parser)]
#[command(name = "kpi-chat")]
#[command(about = "Retail store KPI chatbot")]
struct Args {
    /// The KPI question in natural language
    query: String,

    /// Path to the precomputed KPI table
    #[arg(short, long, default_value = "data/kpi_precomputed.csv")]
    data: PathBuf,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Anchor date for relative phrases like "yesterday" (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print the filtered context table after the answer
    #[arg(long)]
    show_table: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("KPI chatbot starting...");
    let dataset = Arc::new(KpiDataset::load_csv(&args.data)?);
    info!(rows = dataset.len(), "loaded precomputed KPI table");

    let api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();
    let llm = LlmClient::new(api_key);

    let today = args.today.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let mut assistant = KpiAssistant::new(llm, dataset, today);
    let result = assistant.ask(&args.query).await?;

    println!("\n=== Answer ===");
    println!("{}", result.answer);

    if args.show_table {
        println!("\n=== Filtered Data ===");
        println!("{}", result.context.to_markdown(result.context.len()));
    }

    Ok(())
}
