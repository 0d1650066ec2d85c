use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::domain::{
    job::CardOutcome,
    job_card::{extract_job_card, PageContext},
    normalize::build_absolute_url,
};

/// Job card selectors, most specific first.
const CARD_SELECTORS: [&str; 4] = [
    "div.has-pointer-d",
    "div.job-card",
    "li.job",
    "article.job",
];

static CARDS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    CARD_SELECTORS
        .iter()
        .map(|css| (*css, Selector::parse(css).expect("card selector is valid")))
        .collect()
});
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("li is valid"));
static REL_NEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[rel='next']").expect("rel next is valid"));
static CLASS_NEXT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.next, a.pagination-next, li.next a").expect("class next is valid")
});
static ACTIVE_PAGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul.pagination li.active, ul.pagination li.selected")
        .expect("active page is valid")
});
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("a is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStrategy {
    Selector(&'static str),
    /// Every `<li>` on the page.
    ListItemFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageStrategy {
    RelNext,
    ClassName,
    NumericPagination,
}

pub struct LocatedCards<'a> {
    pub strategy: CardStrategy,
    pub cards: Vec<ElementRef<'a>>,
}

/// Cards from the first selector with any match, otherwise every list item.
pub fn locate_job_cards(document: &Html) -> LocatedCards {
    for &(css, ref selector) in CARDS.iter() {
        let cards: Vec<ElementRef> = document.select(selector).collect();
        if !cards.is_empty() {
            return LocatedCards {
                strategy: CardStrategy::Selector(css),
                cards,
            };
        }
    }

    LocatedCards {
        strategy: CardStrategy::ListItemFallback,
        cards: document.select(&LIST_ITEM).collect(),
    }
}

fn href_of(anchor: ElementRef) -> Option<&str> {
    anchor
        .value()
        .attr("href")
        .filter(|href| !href.trim().is_empty())
}

fn numeric_pagination_href(document: &Html) -> Option<&str> {
    let current = document.select(&ACTIVE_PAGE).next()?;
    let next_item = current
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "li")?;
    let anchor = next_item.select(&ANCHOR).next()?;
    href_of(anchor)
}

fn next_page_href(document: &Html) -> Option<(NextPageStrategy, &str)> {
    if let Some(href) = document.select(&REL_NEXT).next().and_then(href_of) {
        return Some((NextPageStrategy::RelNext, href));
    }
    if let Some(href) = document.select(&CLASS_NEXT).next().and_then(href_of) {
        return Some((NextPageStrategy::ClassName, href));
    }
    numeric_pagination_href(document).map(|href| (NextPageStrategy::NumericPagination, href))
}

/// Absolute URL of the following results page, `None` when there is none.
pub fn find_next_page_url(document: &Html, current_url: &str) -> Option<String> {
    let Some((strategy, href)) = next_page_href(document) else {
        log::debug!("No next page found for {}", current_url);
        return None;
    };

    match build_absolute_url(current_url, href) {
        Ok(next_url) => {
            log::debug!("Next page ({:?}) -> {}", strategy, next_url);
            Some(next_url)
        }
        Err(e) => {
            log::warn!(
                "Ignoring next page link {:?} on {}: {:?}",
                href,
                current_url,
                e
            );
            None
        }
    }
}

/// A fetched results page.
pub struct ListingPage {
    document: Html,
}

impl ListingPage {
    pub fn parse(html: &str) -> Self {
        ListingPage {
            document: Html::parse_document(html),
        }
    }

    /// Runs the extractor over every located card, in page order.
    pub fn job_outcomes(&self, ctx: &PageContext) -> (CardStrategy, Vec<CardOutcome>) {
        let located = locate_job_cards(&self.document);
        let outcomes = located
            .cards
            .into_iter()
            .map(|card| extract_job_card(card, ctx))
            .collect();

        (located.strategy, outcomes)
    }

    pub fn next_page_url(&self, current_url: &str) -> Option<String> {
        find_next_page_url(&self.document, current_url)
    }
}
