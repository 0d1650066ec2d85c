use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::configuration::HttpSettings;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {url} after {attempts} attempts: {reason}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        reason: String,
    },
    #[error("invalid proxy {proxy}: {source}")]
    InvalidProxy {
        proxy: String,
        source: reqwest::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Anything that can hand back the body of a results page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// GET with timeout, exponential backoff between attempts and a fixed
/// pause after every successful request.
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    backoff_factor: f64,
    request_delay: Duration,
}

/// Negative or NaN is no wait; anything too large saturates.
fn seconds(value: f64) -> Duration {
    match value > 0.0 {
        true => Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX),
        false => Duration::ZERO,
    }
}

fn build_proxy(scheme: &str, url: &str) -> Result<reqwest::Proxy, reqwest::Error> {
    match scheme {
        "http" => reqwest::Proxy::http(url),
        "https" => reqwest::Proxy::https(url),
        _ => reqwest::Proxy::all(url),
    }
}

impl HttpClient {
    pub fn new(settings: &HttpSettings, request_delay_seconds: f64) -> Result<Self, FetchError> {
        let user_agent = match settings.user_agent.trim() {
            "" => fake_user_agent::get_rua().to_string(),
            ua => ua.to_string(),
        };

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(settings.timeout))
            .cookie_store(true);

        for (scheme, proxy) in settings.proxies.iter().flatten() {
            let proxy_config =
                build_proxy(scheme, proxy).map_err(|source| FetchError::InvalidProxy {
                    proxy: proxy.clone(),
                    source,
                })?;
            builder = builder.proxy(proxy_config);
        }

        Ok(HttpClient {
            client: builder.build()?,
            max_retries: settings.max_retries,
            backoff_factor: settings.backoff_factor,
            request_delay: seconds(request_delay_seconds),
        })
    }

    /// Sleep before attempt `attempt + 1`.
    fn backoff(&self, attempt: u32) -> Duration {
        seconds(self.backoff_factor * 2f64.powi(attempt.saturating_sub(1) as i32))
    }

    async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let res = self.client.get(url).send().await?;

        if res.status().as_u16() >= 400 {
            log::warn!("Non-success status code {} for {}", res.status(), url);
        }

        res.error_for_status()?.text().await
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = String::from("no attempts configured");

        for attempt in 1..=self.max_retries {
            log::debug!("Requesting URL (attempt {}): {}", attempt, url);

            match self.get_text(url).await {
                Ok(body) => {
                    if !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                    return Ok(body);
                }
                Err(e) => {
                    log::error!(
                        "Error fetching {} on attempt {}/{}: {:?}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_retries,
            reason: last_error,
        })
    }
}
