pub mod exporter;
pub mod http_client;
pub mod job_scraper;

pub use exporter::*;
pub use http_client::*;
pub use job_scraper::*;
