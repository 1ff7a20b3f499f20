mod dataset;
mod error;
mod ingest;
mod pipeline;
mod report;
mod transform;
mod utils;
mod validate;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::dataset::schema::ARTWORK_FINANCIAL;
use crate::ingest::event_log::{CsvEventLog, EventLog, NewFinancialEvent};
use crate::transform::aggregate::CountPolicy;
use crate::utils::config::{load_config, Overrides};

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate, join and summarize artwork datasets", long_about = None)]
struct Cli {
    /// Config file (defaults to ./art-pipeline.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the source CSVs
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch pipeline (the default)
    Run(RunArgs),
    /// Append a financial event to the event log and print its id
    RecordEvent(RecordEventArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Directory the enriched and summary tables are written to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// What artwork_count counts per artist
    #[arg(long, value_enum)]
    count_policy: Option<CountPolicy>,

    /// Only let these event types contribute to price totals (repeatable)
    #[arg(long = "price-event-type")]
    price_event_types: Vec<String>,
}

#[derive(Args, Debug)]
struct RecordEventArgs {
    #[arg(long)]
    artwork_id: String,
    #[arg(long)]
    event_type: String,
    /// ISO date, e.g. 2024-05-01
    #[arg(long)]
    event_date: String,
    #[arg(long, default_value = "USD")]
    currency: String,
    #[arg(long)]
    price_amount: Option<f64>,
    #[arg(long, default_value = "")]
    buyer_name: String,
    #[arg(long, default_value = "")]
    seller_name: String,
    #[arg(long, default_value = "")]
    sale_location: String,
    #[arg(long, default_value = "")]
    source: String,
    #[arg(long, default_value = "")]
    notes: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            let config = config.with_overrides(Overrides {
                data_dir: cli.data_dir,
                out_dir: args.out_dir,
                count_policy: args.count_policy,
                price_event_types: args.price_event_types,
            });
            let events = CsvEventLog::new(config.data_dir.join(ARTWORK_FINANCIAL.source_file));

            info!("Art data pipeline starting...");
            let report = pipeline::run(&config, &events).context("Pipeline run failed")?;

            println!();
            print!("{}", report.rendered);
            println!();
            println!("Saved enriched data to {}", report.enriched.path.display());
            println!("Saved summary to {}", report.summary.path.display());
            info!(
                "Pipeline completed with {} validation warnings.",
                report.warnings.len()
            );
        }
        Command::RecordEvent(args) => {
            let data_dir = cli.data_dir.unwrap_or(config.data_dir);
            let events = CsvEventLog::new(data_dir.join(ARTWORK_FINANCIAL.source_file));
            let id = events
                .append(NewFinancialEvent {
                    artwork_id: args.artwork_id,
                    event_type: args.event_type,
                    event_date: args.event_date,
                    currency: args.currency,
                    price_amount: args.price_amount,
                    buyer_name: args.buyer_name,
                    seller_name: args.seller_name,
                    sale_location: args.sale_location,
                    source: args.source,
                    notes: args.notes,
                })
                .with_context(|| format!("Failed to record event in {}", events.path().display()))?;
            println!("{}", id);
        }
    }

    Ok(())
}
