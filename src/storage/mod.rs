//! Storage abstractions for harvest records.
//!
//! Two independent tables are kept: one for posting records and one for
//! embedded-URL records. Markup and text columns are deliberately excluded
//! from both tables; full message content goes to the blob store instead,
//! on a best-effort basis.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Captured, EmbeddedUrlRecord, PostingRecord};

// Re-export for convenience
pub use local::LocalStore;

/// Tabular row for one posting record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostingRow {
    pub id: u64,
    pub week: String,
    pub url: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub salary_flag: Captured<bool>,
}

impl From<&PostingRecord> for PostingRow {
    fn from(record: &PostingRecord) -> Self {
        Self {
            id: record.sequence_id,
            week: record.week_label.clone(),
            url: record.source_url.clone(),
            captured_at: record.captured_at,
            salary_flag: record.has_salary_signal.clone(),
        }
    }
}

/// Tabular row for one embedded-URL record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedUrlRow {
    pub posting_id: u64,
    pub id: u64,
    pub week: String,
    pub posting_url: Option<String>,
    pub embedded_url: String,
    pub captured_at: DateTime<Utc>,
    pub salary_flag: Captured<bool>,
}

impl From<&EmbeddedUrlRecord> for EmbeddedUrlRow {
    fn from(record: &EmbeddedUrlRecord) -> Self {
        Self {
            posting_id: record.posting_sequence_id,
            id: record.sequence_id,
            week: record.week_label.clone(),
            posting_url: record.posting_source_url.clone(),
            embedded_url: record.embedded_url.clone(),
            captured_at: record.captured_at,
            salary_flag: record.has_salary_signal.clone(),
        }
    }
}

/// What a blob holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    SourceCode,
    Text,
}

impl BlobKind {
    /// File-name suffix for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            BlobKind::SourceCode => "source_code",
            BlobKind::Text => "text",
        }
    }
}

/// Which table a blob belongs to. Posting ids and embedded-URL ids are
/// independent sequences, so their blobs live in separate namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobTable {
    Postings,
    EmbeddedUrls,
}

impl BlobTable {
    /// Directory name for this table's blobs.
    pub fn dir(&self) -> &'static str {
        match self {
            BlobTable::Postings => "postings",
            BlobTable::EmbeddedUrls => "embedded_urls",
        }
    }
}

/// Trait for the tabular record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Week labels of all recorded postings, in row order (may repeat).
    async fn week_labels(&self) -> Result<Vec<String>>;

    /// Number of rows in the posting table.
    async fn posting_count(&self) -> Result<u64>;

    /// Number of rows in the embedded-URL table.
    async fn embedded_count(&self) -> Result<u64>;

    /// Append posting rows, preserving input order.
    async fn append_postings(&self, records: &[PostingRecord]) -> Result<()>;

    /// Append embedded-URL rows, preserving input order.
    async fn append_embedded(&self, records: &[EmbeddedUrlRecord]) -> Result<()>;
}

/// Trait for the best-effort blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store one content blob for a record. Callers treat failures as
    /// non-fatal.
    async fn store_blob(
        &self,
        table: BlobTable,
        record_id: u64,
        kind: BlobKind,
        content: &str,
    ) -> Result<()>;
}
