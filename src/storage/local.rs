//! Local filesystem storage backend.
//!
//! Stands in for the spreadsheet/drive collaborators during development and
//! self-hosted runs.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── postings.json        # Posting table (ordered rows)
//! ├── embedded_urls.json   # Embedded-URL table (ordered rows)
//! └── blobs/               # Message markup and text, one file per field
//!     ├── postings/{id}_{suffix}.txt
//!     └── embedded_urls/{id}_{suffix}.txt
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{EmbeddedUrlRecord, PostingRecord};
use crate::storage::{BlobKind, BlobStore, BlobTable, EmbeddedUrlRow, PostingRow, RecordStore};

const POSTINGS_FILE: &str = "postings.json";
const EMBEDDED_FILE: &str = "embedded_urls.json";

/// Local filesystem record and blob store.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read JSON rows, or an empty table if the file doesn't exist yet.
    async fn read_rows<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn append_rows<T, R>(&self, key: &str, records: &[R]) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        for<'a> T: From<&'a R>,
    {
        let mut rows: Vec<T> = self.read_rows(key).await?;
        rows.extend(records.iter().map(T::from));
        self.write_json(key, &rows).await
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn week_labels(&self) -> Result<Vec<String>> {
        let rows: Vec<PostingRow> = self.read_rows(POSTINGS_FILE).await?;
        Ok(rows.into_iter().map(|row| row.week).collect())
    }

    async fn posting_count(&self) -> Result<u64> {
        let rows: Vec<PostingRow> = self.read_rows(POSTINGS_FILE).await?;
        Ok(rows.len() as u64)
    }

    async fn embedded_count(&self) -> Result<u64> {
        let rows: Vec<EmbeddedUrlRow> = self.read_rows(EMBEDDED_FILE).await?;
        Ok(rows.len() as u64)
    }

    async fn append_postings(&self, records: &[PostingRecord]) -> Result<()> {
        self.append_rows::<PostingRow, _>(POSTINGS_FILE, records).await
    }

    async fn append_embedded(&self, records: &[EmbeddedUrlRecord]) -> Result<()> {
        self.append_rows::<EmbeddedUrlRow, _>(EMBEDDED_FILE, records).await
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn store_blob(
        &self,
        table: BlobTable,
        record_id: u64,
        kind: BlobKind,
        content: &str,
    ) -> Result<()> {
        let key = format!("blobs/{}/{}_{}.txt", table.dir(), record_id, kind.suffix());
        self.write_bytes(&key, content.as_bytes()).await
    }
}
