use std::path::PathBuf;

use anyhow::Context;
use bayt_jobs::{
    configuration::get_configuration,
    startup::{run, RunOptions},
};
use clap::Parser;
use env_logger::Env;

/// Scrape job listings from Bayt.com and export structured data.
#[derive(Parser)]
#[command(name = "bayt-jobs")]
#[command(version)]
struct Cli {
    /// Path to the settings file
    #[arg(long, default_value = "config/settings.json")]
    settings: PathBuf,

    /// Path to input JSON file with search URLs configuration
    #[arg(long, default_value = "data/inputs.sample.json")]
    inputs: PathBuf,

    /// Explicit output file path; defaults to the inputs or settings file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Export format: json, jsonl, csv, excel, xml, html
    #[arg(long)]
    format: Option<String>,

    /// Override maxItems for searches that do not set one
    #[arg(long)]
    max_items: Option<usize>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.to_lowercase()))
        .init();

    let settings = get_configuration(&cli.settings).context("Failed to read configuration.")?;

    run(
        settings,
        RunOptions {
            inputs_path: cli.inputs,
            output: cli.output,
            format: cli.format,
            max_items: cli.max_items,
        },
    )
    .await?;

    Ok(())
}
