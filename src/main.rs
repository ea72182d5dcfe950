use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod dataset;
mod filter;
mod models;
mod present;
mod report;
mod server;

use filter::{RawFilterInput, RawValue};

#[derive(Parser)]
#[command(name = "call-panel")]
#[command(about = "Call log monitoring dashboard for a switchboard", long_about = None)]
struct Cli {
    /// Call log exported as a delimited table
    #[arg(long, global = true, env = "CSV_PATH", default_value = "ligacoes_tratadas.csv")]
    csv: PathBuf,
    #[arg(long, global = true, default_value_t = ';')]
    delimiter: char,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API over HTTP
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "PORT", default_value_t = 8050)]
        port: u16,
    },
    /// Print the indicators for a filter selection
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the full display bundle as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

/// Filter fields are taken as typed; bad values fall back the same way the UI does.
#[derive(Args)]
struct FilterArgs {
    /// YYYY-MM-DD, defaults to the first call
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    start_hour: Option<String>,
    #[arg(long)]
    start_minute: Option<String>,
    /// YYYY-MM-DD, defaults to the last call
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    end_hour: Option<String>,
    #[arg(long)]
    end_minute: Option<String>,
    /// Repeat to select several; omit for all destinations
    #[arg(long = "destination")]
    destinations: Vec<String>,
}

impl From<FilterArgs> for RawFilterInput {
    fn from(args: FilterArgs) -> Self {
        let value = |field: Option<String>| field.map(RawValue::Text);
        RawFilterInput {
            start_date: value(args.start_date),
            start_hour: value(args.start_hour),
            start_minute: value(args.start_minute),
            end_date: value(args.end_date),
            end_hour: value(args.end_hour),
            end_minute: value(args.end_minute),
            destinations: args.destinations,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let delimiter = u8::try_from(cli.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .context("--delimiter must be a single ASCII character")?;
    let dataset = dataset::load(&cli.csv, delimiter)?;

    match cli.command {
        Commands::Serve { host, port } => {
            server::serve(Arc::new(dataset), SocketAddr::new(host, port)).await?;
        }
        Commands::Summary { filter: args, json } => {
            let bundle = present::dashboard(&args.into(), &dataset);

            if json {
                println!("{}", serde_json::to_string_pretty(&bundle)?);
                return Ok(());
            }

            println!("Total calls: {}", bundle.total);
            println!("Answered: {}", bundle.answered);
            println!("Unanswered: {}", bundle.unanswered);
            println!("Answer rate: {}", bundle.answer_rate);
            println!("Mean duration (answered): {}", bundle.mean_duration);
            println!("Talk time per day: {}", bundle.mean_daily_talk);
        }
        Commands::Report { filter: args, out } => {
            let raw = RawFilterInput::from(args);
            let criteria = filter::criteria(&raw, &dataset);
            let bundle = present::dashboard(&raw, &dataset);
            let report = report::build_report(&criteria, &bundle);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
