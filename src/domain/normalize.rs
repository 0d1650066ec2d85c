use chrono::{Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static RELATIVE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(day|days|week|weeks|month|months|year|years)\s+ago")
        .expect("relative date pattern is valid")
});

/// Collapses every whitespace run to a single space and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Resolves `link` against `base_url`. An empty link stays empty and an
/// absolute link comes back unchanged.
pub fn build_absolute_url(base_url: &str, link: &str) -> Result<String, url::ParseError> {
    let link = link.trim();
    if link.is_empty() {
        return Ok(String::new());
    }

    let base = Url::parse(base_url)?;
    Ok(base.join(link)?.to_string())
}

/// Turns phrases like "today" or "3 weeks ago" into an ISO-8601 date
/// relative to `today`. Anything else is returned trimmed.
pub fn parse_relative_date(date_str: &str, today: NaiveDate) -> String {
    let original = date_str.trim();
    let text = original.to_lowercase();

    match text.as_str() {
        "" => return String::new(),
        "today" => return today.to_string(),
        "yesterday" => {
            return today
                .checked_sub_days(Days::new(1))
                .map(|date| date.to_string())
                .unwrap_or_else(|| original.to_string())
        }
        _ => {}
    }

    let Some(captures) = RELATIVE_DATE.captures(&text) else {
        return original.to_string();
    };
    let Ok(value) = captures[1].parse::<u32>() else {
        return original.to_string();
    };

    let shifted = match captures[2].trim_end_matches('s') {
        "day" => today.checked_sub_days(Days::new(u64::from(value))),
        "week" => today.checked_sub_days(Days::new(u64::from(value) * 7)),
        "month" => today.checked_sub_months(Months::new(value)),
        "year" => value
            .checked_mul(12)
            .and_then(|months| today.checked_sub_months(Months::new(months))),
        _ => None,
    };

    match shifted {
        Some(date) => date.to_string(),
        None => original.to_string(),
    }
}
