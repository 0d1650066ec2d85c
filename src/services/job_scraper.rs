use chrono::{NaiveDate, Utc};

use crate::domain::{
    job::{CardOutcome, JobRecord, SearchDefinition},
    job_card::PageContext,
    listing_page::{CardStrategy, ListingPage},
};

use super::PageFetcher;

/// Per-search crawl progress.
struct CrawlState {
    next_url: Option<String>,
    jobs: Vec<JobRecord>,
    max_items: usize,
}

impl CrawlState {
    fn new(search_url: &str, max_items: usize) -> Self {
        CrawlState {
            next_url: Some(search_url.to_string()),
            jobs: vec![],
            max_items,
        }
    }

    fn is_full(&self) -> bool {
        self.jobs.len() >= self.max_items
    }

    /// Keeps records up to the cap and drops the rest of the page.
    fn absorb(&mut self, jobs: Vec<JobRecord>) {
        let room = self.max_items.saturating_sub(self.jobs.len());
        self.jobs.extend(jobs.into_iter().take(room));
    }
}

/// Crawls search result pages and turns their job cards into records.
pub struct JobScraper<F> {
    fetcher: F,
}

impl<F: PageFetcher> JobScraper<F> {
    pub fn new(fetcher: F) -> Self {
        JobScraper { fetcher }
    }

    /// Runs every search in order and concatenates their records.
    pub async fn scrape_searches(
        &self,
        searches: &[SearchDefinition],
        max_items_fallback: usize,
    ) -> Vec<JobRecord> {
        let mut all_jobs = vec![];

        for search in searches {
            let url = match search.url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => url,
                _ => {
                    log::warn!("Skipping search with missing 'url' key: {:?}", search);
                    continue;
                }
            };

            let max_items = search.effective_max_items(max_items_fallback);
            log::info!(
                "Scraping Bayt search URL: {} (max_items={})",
                url,
                max_items
            );

            let jobs = self.scrape_single_search(url, max_items).await;
            log::info!("Found {} jobs for search URL: {}", jobs.len(), url);
            all_jobs.extend(jobs);
        }

        all_jobs
    }

    /// Follows next-page links from `search_url` until the cap is hit, a
    /// page cannot be fetched or there is no next page.
    pub async fn scrape_single_search(&self, search_url: &str, max_items: usize) -> Vec<JobRecord> {
        let mut state = CrawlState::new(search_url, max_items);

        while let Some(page_url) = state.next_url.take() {
            if state.is_full() {
                break;
            }

            let html = match self.fetcher.fetch(&page_url).await {
                Ok(html) => html,
                Err(e) => {
                    log::error!("Failed to fetch page: {} ({})", page_url, e);
                    break;
                }
            };

            let today = Utc::now().date_naive();
            let next_url = process_page(&mut state, &html, search_url, &page_url, today);
            state.next_url = next_url;
        }

        state.jobs
    }
}

/// Extracts one page into `state` and returns the next page to fetch.
fn process_page(
    state: &mut CrawlState,
    html: &str,
    search_url: &str,
    page_url: &str,
    today: NaiveDate,
) -> Option<String> {
    let page = ListingPage::parse(html);
    let ctx = PageContext {
        search_url,
        page_url,
        today,
    };

    let (strategy, outcomes) = page.job_outcomes(&ctx);
    match strategy {
        CardStrategy::Selector(css) => {
            log::debug!("Found {} job cards using selector '{}'", outcomes.len(), css)
        }
        CardStrategy::ListItemFallback => log::debug!(
            "Using fallback selector; found {} li elements",
            outcomes.len()
        ),
    }
    if outcomes.is_empty() {
        log::warn!("No job cards found for page: {}", page_url);
    }

    let mut jobs = vec![];
    for outcome in outcomes {
        match outcome {
            CardOutcome::Extracted(job) => jobs.push(job),
            CardOutcome::Skipped => {
                log::debug!("Skipping card without title and link on {}", page_url)
            }
            CardOutcome::Faulted(reason) => {
                log::error!("Error parsing job card on {}: {}", page_url, reason)
            }
        }
    }

    state.absorb(jobs);
    match state.is_full() {
        true => None,
        false => page.next_page_url(page_url),
    }
}
