pub mod job;
pub mod job_card;
pub mod listing_page;
pub mod normalize;
