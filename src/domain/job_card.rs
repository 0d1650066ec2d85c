use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use crate::domain::{
    job::{CardOutcome, JobRecord},
    normalize::{build_absolute_url, clean_text, parse_relative_date},
};

const CAREER_LEVEL_MARKER: &str = "Career Level";

fn selectors(candidates: &[&str]) -> Vec<Selector> {
    candidates
        .iter()
        .map(|css| Selector::parse(css).expect("card selector is valid"))
        .collect()
}

static TITLE_LINK: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["h2 a", "h3 a", "a.job-title", "a.js-job-title"]));
static ANY_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("a is valid"));
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img is valid"));
static COMPANY: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        ".company",
        ".company-name",
        ".jbHeading span a",
        ".jbHeading span",
    ])
});
static LOCATION: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".location", ".jbLoc", ".job-location"]));
static SALARY: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&[".salary", ".job-salary"]));
static JOB_TYPE: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".job-type", ".jbType", ".employment-type"]));
static DESCRIPTION: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[".job-desc", ".job-description", ".jbDescription", "p"])
});
static CREATED_AT: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".date", ".jbDate", ".job-date"]));

/// Where a card was found.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub search_url: &'a str,
    pub page_url: &'a str,
    pub today: NaiveDate,
}

pub fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Text of the first candidate that has any.
fn first_text(card: ElementRef, candidates: &[Selector]) -> String {
    candidates
        .iter()
        .filter_map(|selector| {
            card.select(selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
        .next()
        .unwrap_or_default()
}

fn title_anchor(card: ElementRef) -> Option<ElementRef> {
    TITLE_LINK
        .iter()
        .find_map(|selector| card.select(selector).next())
        .or_else(|| card.select(&ANY_LINK).next())
}

fn career_level(card: ElementRef) -> String {
    card.text()
        .find(|text| text.contains(CAREER_LEVEL_MARKER))
        .and_then(|text| text.split_once(':'))
        .map(|(_, level)| clean_text(level))
        .unwrap_or_default()
}

fn company_logo(card: ElementRef, page_url: &str) -> String {
    let logo_src = card
        .select(&IMAGE)
        .find(|img| {
            let alt = img.value().attr("alt").unwrap_or_default();
            let src = img.value().attr("src").unwrap_or_default();
            alt.contains("logo") || src.contains("logo")
        })
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default();

    match build_absolute_url(page_url, logo_src) {
        Ok(url) => url,
        Err(e) => {
            log::warn!(
                "Could not resolve logo {:?} on {}: {:?}",
                logo_src,
                page_url,
                e
            );
            String::new()
        }
    }
}

/// Builds a job record out of one card. Cards without a title and a link
/// are skipped; an unresolvable title link faults the whole card.
pub fn extract_job_card(card: ElementRef, ctx: &PageContext) -> CardOutcome {
    let anchor = title_anchor(card);
    let job_title = anchor.map(element_text).unwrap_or_default();
    let href = anchor
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default();

    let job_link = match build_absolute_url(ctx.page_url, href) {
        Ok(link) => link,
        Err(e) => {
            return CardOutcome::Faulted(format!("cannot resolve job link {:?}: {}", href, e))
        }
    };

    let created_at_raw = first_text(card, &CREATED_AT);

    let job = JobRecord {
        search_url: ctx.search_url.to_string(),
        job_title,
        job_link,
        job_salary: first_text(card, &SALARY),
        job_type: first_text(card, &JOB_TYPE),
        job_career_level: career_level(card),
        job_company_logo: company_logo(card, ctx.page_url),
        job_company: first_text(card, &COMPANY),
        job_location: first_text(card, &LOCATION),
        job_description: first_text(card, &DESCRIPTION),
        job_created_at: parse_relative_date(&created_at_raw, ctx.today),
    };

    match job.is_admissible() {
        true => CardOutcome::Extracted(job),
        false => CardOutcome::Skipped,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use scraper::{Html, Selector};

    use super::{extract_job_card, CardOutcome, PageContext};
    use crate::domain::job::JobRecord;

    const SEARCH_URL: &str = "https://www.bayt.com/en/uae/jobs/rust-jobs/";
    const PAGE_URL: &str = "https://www.bayt.com/en/uae/jobs/rust-jobs/?page=2";

    fn ctx() -> PageContext<'static> {
        PageContext {
            search_url: SEARCH_URL,
            page_url: PAGE_URL,
            today: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        }
    }

    fn extract(card_html: &str, ctx: &PageContext) -> CardOutcome {
        let document = Html::parse_fragment(card_html);
        let selector = Selector::parse("div.card").unwrap();
        let card = document.select(&selector).next().unwrap();
        extract_job_card(card, ctx)
    }

    fn extracted(card_html: &str) -> JobRecord {
        match extract(card_html, &ctx()) {
            CardOutcome::Extracted(job) => job,
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn extract_full_card() {
        let job = extracted(
            r#"
            <div class="card">
                <img alt="Acme logo" src="/images/acme.png">
                <h2><a href="/en/uae/jobs/rust-engineer-123/">  Rust
                    Engineer </a></h2>
                <div class="jbHeading"><span><a href="/company/acme">Acme Corp</a></span></div>
                <span class="jbLoc">Dubai, UAE</span>
                <span class="salary">AED 20,000</span>
                <span class="jbType">Full Time</span>
                <div class="jbDescription">Build   crawlers.</div>
                <span class="jbDate">3 days ago</span>
            </div>
            "#,
        );

        assert_eq!(job.search_url, SEARCH_URL);
        assert_eq!(job.job_title, "Rust Engineer");
        assert_eq!(
            job.job_link,
            "https://www.bayt.com/en/uae/jobs/rust-engineer-123/"
        );
        assert_eq!(job.job_company, "Acme Corp");
        assert_eq!(job.job_location, "Dubai, UAE");
        assert_eq!(job.job_salary, "AED 20,000");
        assert_eq!(job.job_type, "Full Time");
        assert_eq!(job.job_description, "Build crawlers.");
        assert_eq!(job.job_company_logo, "https://www.bayt.com/images/acme.png");
        assert_eq!(job.job_created_at, "2024-05-07");
        assert_eq!(job.job_career_level, "");
    }

    #[test]
    fn extract_career_level_from_text() {
        let job = extracted(
            r#"<div class="card"><a href="/job/1">Dev</a><p>Career Level: Senior</p></div>"#,
        );
        assert_eq!(job.job_career_level, "Senior");

        let job = extracted(r#"<div class="card"><a href="/job/1">Dev</a><p>Senior</p></div>"#);
        assert_eq!(job.job_career_level, "");
    }

    #[test]
    fn extract_career_level_keeps_text_after_first_colon() {
        let job = extracted(
            r#"<div class="card"><a href="/job/1">Dev</a><li>Career Level:  Mid: Lead </li></div>"#,
        );
        assert_eq!(job.job_career_level, "Mid: Lead");
    }

    #[test]
    fn extract_falls_back_to_first_anchor() {
        let job = extracted(
            r#"<div class="card"><span>Hiring</span><a href="https://jobs.example.com/9">Data Analyst</a></div>"#,
        );
        assert_eq!(job.job_title, "Data Analyst");
        assert_eq!(job.job_link, "https://jobs.example.com/9");
    }

    #[test]
    fn extract_prefers_title_selectors_over_earlier_anchors() {
        let job = extracted(
            r#"<div class="card"><a href="/company/acme">Acme</a><h3><a href="/job/7">QA Lead</a></h3></div>"#,
        );
        assert_eq!(job.job_title, "QA Lead");
        assert_eq!(job.job_link, "https://www.bayt.com/job/7");
    }

    #[test]
    fn extract_skips_empty_selector_matches() {
        let job = extracted(
            r#"<div class="card"><a href="/job/1">Dev</a><span class="company"> </span><span class="company-name">Globex</span></div>"#,
        );
        assert_eq!(job.job_company, "Globex");
    }

    #[test]
    fn extract_description_falls_back_to_paragraph() {
        let job = extracted(
            r#"<div class="card"><a href="/job/1">Dev</a><p>Remote friendly team.</p></div>"#,
        );
        assert_eq!(job.job_description, "Remote friendly team.");
    }

    #[test]
    fn extract_logo_by_src() {
        let job = extracted(
            r#"<div class="card"><img src="/static/avatar.png" alt="person"><img src="/static/company-logo.svg"><a href="/job/1">Dev</a></div>"#,
        );
        assert_eq!(
            job.job_company_logo,
            "https://www.bayt.com/static/company-logo.svg"
        );
    }

    #[test]
    fn extract_unrecognized_date_is_kept() {
        let job = extracted(
            r#"<div class="card"><a href="/job/1">Dev</a><span class="date"> Posted on 12 May </span></div>"#,
        );
        assert_eq!(job.job_created_at, "Posted on 12 May");
    }

    #[test]
    fn card_without_title_or_link_is_skipped() {
        let outcome = extract(
            r#"<div class="card"><span class="company">Acme</span><p>Career Level: Senior</p></div>"#,
            &ctx(),
        );
        assert_eq!(outcome, CardOutcome::Skipped);

        let outcome = extract(r#"<div class="card"><a>   </a></div>"#, &ctx());
        assert_eq!(outcome, CardOutcome::Skipped);
    }

    #[test]
    fn card_with_link_only_is_kept() {
        let job = extracted(r#"<div class="card"><a href="/job/5"><img src="/x.png"></a></div>"#);
        assert_eq!(job.job_title, "");
        assert_eq!(job.job_link, "https://www.bayt.com/job/5");
    }

    #[test]
    fn unresolvable_link_faults_card() {
        let ctx = PageContext {
            page_url: "not a url",
            ..ctx()
        };
        let outcome = extract(r#"<div class="card"><a href="/job/1">Dev</a></div>"#, &ctx);
        assert!(matches!(outcome, CardOutcome::Faulted(_)));
    }
}
