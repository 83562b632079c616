use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use order_cleaner::app::clean_use_case::CleanUseCase;
use order_cleaner::app::report_use_case::ReportUseCase;
use order_cleaner::infra::{ConsoleReportAdapter, JsonReportAdapter, NdjsonOutputAdapter};
use order_cleaner::observability::{init_logging, metrics};
use order_cleaner::pipeline::ingestion::{write_batch, Ingestor, RawBatch};
use order_cleaner::pipeline::processing::diagnostics::find_duplicate_ids;
use order_cleaner::{Config, Pipeline};

#[derive(Parser)]
#[command(name = "order_cleaner")]
#[command(about = "Validate, normalize and report on raw e-commerce order batches")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to $ORDER_CLEANER_CONFIG, then built-in rules)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    /// Directory for JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a batch and write records plus diagnostics as NDJSON
    Clean {
        /// Input file (.csv or .json)
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Clean a batch and print the aggregate reports
    Report {
        #[arg(long)]
        input: PathBuf,
        /// Number of customers in the top-spender ranking
        #[arg(long)]
        top: Option<usize>,
        /// Also write the reports to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List order ids that occur more than once
    Duplicates {
        #[arg(long)]
        input: PathBuf,
    },
    /// Write the built-in demonstration table to a .csv or .json file
    Seed {
        #[arg(long)]
        output: PathBuf,
    },
    /// Clean, write outputs and print reports; uses the demo table without --input
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
}

fn load_batch(input: Option<&Path>) -> anyhow::Result<RawBatch> {
    match input {
        Some(path) => Ingestor::from_path(path)
            .with_context(|| format!("Failed to ingest '{}'", path.display())),
        None => {
            info!("No input given, using the demonstration table");
            Ok(Ingestor::demo_batch())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli.log_dir);
    if cli.metrics {
        if let Err(e) = metrics::init() {
            warn!("Metrics disabled: {}", e);
        }
    }

    let mut config = Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;

    let result = match cli.command {
        Commands::Clean { input, out_dir } => {
            println!("🧹 Cleaning {}...", input.display());
            let batch = load_batch(Some(&input))?;
            let pipeline = Pipeline::from_config(&config);

            let output = NdjsonOutputAdapter::new(&out_dir)?;
            let records_path = output.records_path().to_path_buf();
            let diagnostics_path = output.diagnostics_path().to_path_buf();
            let cleaned = CleanUseCase::new(&pipeline, Box::new(output))
                .execute(&batch)
                .await?;

            let stats = cleaned.stats();
            println!("   Records: {}", stats.total_records);
            println!("   Fully clean: {}", stats.fully_clean);
            println!("   Rejected fields: {}", stats.rejected_fields);
            println!("   Records file: {}", records_path.display());
            println!("   Diagnostics file: {}", diagnostics_path.display());
            Ok(())
        }
        Commands::Report { input, top, json } => {
            if let Some(top) = top {
                config.report.top_customers = top;
                config.validate()?;
            }
            let batch = load_batch(Some(&input))?;
            let pipeline = Pipeline::from_config(&config);
            let cleaned = pipeline.clean(&batch);

            let mut use_case = ReportUseCase::new(&pipeline).with_output(Box::new(ConsoleReportAdapter));
            if let Some(path) = json {
                use_case = use_case.with_output(Box::new(JsonReportAdapter::new(&path)));
            }
            use_case.execute(&cleaned).await.map(|_| ())
        }
        Commands::Duplicates { input } => {
            let batch = load_batch(Some(&input))?;
            let duplicates = find_duplicate_ids(&batch);
            if duplicates.is_empty() {
                println!("✅ No duplicate order ids in {} records", batch.len());
            } else {
                println!("⚠️  {} duplicated order ids:", duplicates.len());
                for group in &duplicates {
                    println!(
                        "   - order_id {} appears {} times (rows {:?})",
                        group.order_id, group.count, group.positions
                    );
                }
            }
            Ok(())
        }
        Commands::Seed { output } => {
            write_batch(&Ingestor::demo_batch(), &output)?;
            println!("🌱 Demonstration table written to {}", output.display());
            Ok(())
        }
        Commands::Run { input, out_dir } => {
            println!("🚀 Running full pipeline...");
            let batch = load_batch(input.as_deref())?;
            let pipeline = Pipeline::from_config(&config);

            println!("\n🧹 Step 1: Cleaning {} records...", batch.len());
            let output = NdjsonOutputAdapter::new(&out_dir)?;
            let cleaned = CleanUseCase::new(&pipeline, Box::new(output))
                .execute(&batch)
                .await?;

            println!("\n📈 Step 2: Building reports...");
            ReportUseCase::new(&pipeline)
                .with_output(Box::new(ConsoleReportAdapter))
                .with_output(Box::new(JsonReportAdapter::new(&out_dir.join("report.json"))))
                .execute(&cleaned)
                .await
                .map(|_| ())
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }

    if cli.metrics {
        if let Some(text) = metrics::render() {
            println!("\n{}", text);
        }
    }

    result
}
