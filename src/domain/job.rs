use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

/// One entry of the search inputs file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchDefinition {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(
        default,
        rename = "maxItems",
        deserialize_with = "deserialize_option_number_from_string"
    )]
    pub max_items: Option<usize>,
}

impl SearchDefinition {
    pub fn new(url: &str, max_items: Option<usize>) -> Self {
        SearchDefinition {
            url: Some(url.to_string()),
            max_items,
        }
    }

    /// The cap for this search: its own `maxItems` unless missing or zero.
    pub fn effective_max_items(&self, fallback: usize) -> usize {
        match self.max_items {
            Some(n) if n > 0 => n,
            _ => fallback,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub search_url: String,
    pub job_title: String,
    pub job_link: String,
    pub job_salary: String,
    pub job_type: String,
    pub job_career_level: String,
    pub job_company_logo: String,
    pub job_company: String,
    pub job_location: String,
    pub job_description: String,
    pub job_created_at: String,
}

impl JobRecord {
    pub const FIELD_NAMES: [&'static str; 11] = [
        "searchUrl",
        "jobTitle",
        "jobLink",
        "jobSalary",
        "jobType",
        "jobCareerLevel",
        "jobCompanyLogo",
        "jobCompany",
        "jobLocation",
        "jobDescription",
        "jobCreatedAt",
    ];

    /// Field values in the same order as [`JobRecord::FIELD_NAMES`].
    pub fn values(&self) -> [&str; 11] {
        [
            &self.search_url,
            &self.job_title,
            &self.job_link,
            &self.job_salary,
            &self.job_type,
            &self.job_career_level,
            &self.job_company_logo,
            &self.job_company,
            &self.job_location,
            &self.job_description,
            &self.job_created_at,
        ]
    }

    /// Only cards with a title or a link count as real postings.
    pub fn is_admissible(&self) -> bool {
        !self.job_title.is_empty() || !self.job_link.is_empty()
    }
}

/// What came out of a single job card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardOutcome {
    Extracted(JobRecord),
    Skipped,
    Faulted(String),
}
