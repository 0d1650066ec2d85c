use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    configuration::{load_search_inputs, OutputSettings, SearchInputs, Settings},
    services::{export_jobs, ExportFormat, HttpClient, JobScraper},
};

/// Command line overrides for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub inputs_path: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub max_items: Option<usize>,
}

pub fn resolve_format(
    cli_format: Option<&str>,
    output: &OutputSettings,
    settings: &Settings,
) -> String {
    cli_format
        .or(output.format.as_deref())
        .unwrap_or(&settings.export.default_format)
        .to_lowercase()
}

pub fn resolve_output_path(
    cli_output: Option<&Path>,
    output: &OutputSettings,
    settings: &Settings,
) -> PathBuf {
    if let Some(path) = cli_output {
        return path.to_path_buf();
    }

    let directory = output
        .directory
        .as_deref()
        .unwrap_or(&settings.export.default_output_dir);
    let filename = output
        .filename
        .as_deref()
        .unwrap_or(&settings.export.default_output_filename);

    directory.join(filename)
}

/// Scrapes every configured search and exports the records. Returns the
/// written file, or `None` when there was nothing to scrape.
pub async fn run(settings: Settings, options: RunOptions) -> anyhow::Result<Option<PathBuf>> {
    log::info!("Starting Bayt Jobs Scraper");

    let inputs = load_search_inputs(&options.inputs_path).unwrap_or_else(|e| {
        log::error!(
            "Input configuration is missing or invalid; expected a JSON object with 'searches' key: {:?}",
            e
        );
        SearchInputs::default()
    });

    if inputs.searches.is_empty() {
        log::error!("No searches defined in inputs. Nothing to do.");
        return Ok(None);
    }

    let max_items_fallback = options
        .max_items
        .unwrap_or(settings.scraper.default_max_items);

    let jobs = {
        let client = HttpClient::new(
            &settings.http,
            settings.scraper.delay_between_requests_seconds,
        )
        .context("Failed to build http client")?;
        JobScraper::new(client)
            .scrape_searches(&inputs.searches, max_items_fallback)
            .await
    };

    match jobs.is_empty() {
        true => log::warn!("No jobs were scraped from the given searches."),
        false => log::info!("Total jobs scraped: {}", jobs.len()),
    }

    let format = resolve_format(options.format.as_deref(), &inputs.output, &settings);
    let output_path = resolve_output_path(options.output.as_deref(), &inputs.output, &settings);

    let export_format: ExportFormat = format.parse()?;
    let written = export_jobs(&jobs, &output_path, export_format).with_context(|| {
        format!(
            "Failed to export jobs to {} ({})",
            output_path.display(),
            format
        )
    })?;

    log::info!(
        "Bayt Jobs Scraper completed successfully. Output: {}",
        written.display()
    );
    Ok(Some(written))
}
