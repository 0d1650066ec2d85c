use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::job::SearchDefinition;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; BaytJobsScraper/1.0; +https://bitbash.dev)";

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub scraper: ScraperSettings,
    pub export: ExportSettings,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HttpSettings {
    /// Empty picks a random browser user agent.
    pub user_agent: String,
    /// Seconds.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub backoff_factor: f64,
    /// Scheme ("http", "https" or "all") to proxy url.
    pub proxies: Option<HashMap<String, String>>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: 15,
            max_retries: 3,
            backoff_factor: 0.5,
            proxies: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ScraperSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub delay_between_requests_seconds: f64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub default_max_items: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        ScraperSettings {
            delay_between_requests_seconds: 1.0,
            default_max_items: 200,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ExportSettings {
    pub default_format: String,
    pub default_output_dir: PathBuf,
    pub default_output_filename: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            default_format: "json".to_string(),
            default_output_dir: PathBuf::from("data"),
            default_output_filename: "output_sample.json".to_string(),
        }
    }
}

/// Reads the settings file (optional) and `APP_` environment overrides,
/// e.g. `APP_HTTP__TIMEOUT=30`.
pub fn get_configuration(settings_path: &Path) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(settings_path).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The searches to run and where their results should go.
#[derive(Clone, Debug, Default)]
pub struct SearchInputs {
    pub searches: Vec<SearchDefinition>,
    pub output: OutputSettings,
}

/// Inputs file as written; searches are decoded one by one.
#[derive(Deserialize)]
struct RawSearchInputs {
    #[serde(default)]
    searches: Vec<serde_json::Value>,
    #[serde(default)]
    output: OutputSettings,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct OutputSettings {
    pub format: Option<String>,
    pub directory: Option<PathBuf>,
    pub filename: Option<String>,
}

pub fn load_search_inputs(path: &Path) -> anyhow::Result<SearchInputs> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read inputs file {}", path.display()))?;

    let inputs: RawSearchInputs = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to decode inputs file {}", path.display()))?;

    let searches = inputs
        .searches
        .into_iter()
        .enumerate()
        .filter_map(
            |(i, entry)| match serde_json::from_value::<SearchDefinition>(entry) {
                Ok(search) => Some(search),
                Err(e) => {
                    log::warn!("Skipping malformed search definition #{}: {}", i + 1, e);
                    None
                }
            },
        )
        .collect();

    Ok(SearchInputs {
        searches,
        output: inputs.output,
    })
}
