// src/services/mod.rs

//! Scraping services: archive-index parsing, posting capture, and
//! embedded-URL capture.

pub mod compilations;
pub mod message_urls;
pub mod postings;

pub use compilations::{parse_archive_index, parse_compilation};
pub use message_urls::MessageUrlScraper;
pub use postings::PostingScraper;
