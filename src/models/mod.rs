// src/models/mod.rs

//! Data structures shared across the harvester.

pub mod archive;
pub mod config;
pub mod record;

pub use archive::{ArchiveEntry, ArchiveIndex, KnownWeeksLedger, WeekPostings};
pub use config::{ArchiveConfig, Config, FetchConfig, RetryConfig, StorageConfig};
pub use record::{Captured, EmbeddedUrlRecord, PostingRecord, FAILURE_SENTINEL};
