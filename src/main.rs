//! shiplog - CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shiplog::config::Config;
use shiplog::report::Reporter;

/// Report what shipped in a repository between two dates.
#[derive(Parser, Debug)]
#[command(name = "shiplog")]
#[command(about = "Report what shipped in a repository between two dates")]
#[command(version)]
struct Cli {
    /// Start of the report window (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// End of the report window (YYYY-MM-DD)
    #[arg(long)]
    end: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let report = match run(&cli).await {
        Ok(report) => report,
        Err(err) => {
            // The same status+message pair an HTTP collaborator would
            // answer with.
            tracing::error!(status = err.status_code(), "report generation failed");
            eprintln!("{}", serde_json::json!({ "message": err.to_string() }));
            std::process::exit(1);
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );

    Ok(())
}

async fn run(cli: &Cli) -> Result<shiplog::Report, shiplog::ReportError> {
    let config = Config::from_env()?;
    let reporter = Reporter::new(config)?;
    reporter.generate_report(&cli.start, &cli.end).await
}
