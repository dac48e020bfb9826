//! Full harvest orchestration.
//!
//! Reads prior state from the record store, diffs the live archive index
//! against it, scrapes the unseen compilations, and hands both record lists
//! to storage. Everything runs on a single logical thread of control: each
//! fetch, parse, and write completes before the next begins.

use crate::error::{AppError, Result};
use crate::fetch::FetchClient;
use crate::models::{Captured, Config, EmbeddedUrlRecord, KnownWeeksLedger, PostingRecord};
use crate::pipeline::diff::diff_against_ledger;
use crate::pipeline::retry::RetryPolicy;
use crate::services::{MessageUrlScraper, PostingScraper, parse_archive_index, parse_compilation};
use crate::storage::{BlobKind, BlobStore, BlobTable, RecordStore};

/// Counts for a completed (or no-op) run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// True when the latest two compilations were already recorded.
    pub noop: bool,
    pub new_weeks: usize,
    pub posting_records: usize,
    pub embedded_records: usize,
}

/// Run the full harvest against the given client and store.
pub async fn run_harvest<S>(config: &Config, client: &dyn FetchClient, store: &S) -> Result<RunSummary>
where
    S: RecordStore + BlobStore,
{
    let retry = RetryPolicy::from(&config.retry);

    // Prior state from the record store.
    let ledger = KnownWeeksLedger::from_labels(store.week_labels().await?);
    let posting_seed = store.posting_count().await?;
    let embedded_seed = store.embedded_count().await?;
    log::info!(
        "Loaded ledger: {} known weeks, {} posting rows, {} embedded-URL rows",
        ledger.len(),
        posting_seed,
        embedded_seed
    );

    // Live archive index. Exhaustion here is fatal: without the index there
    // is no run.
    let index_url = config.archive.index_url.as_str();
    let index = retry
        .execute("archive index fetch", async || {
            client.reauthenticate().await?;
            let markup = client.fetch_page(index_url).await?;
            parse_archive_index(&markup, index_url)
        })
        .await?;

    let live = index.recent(2).ok_or_else(|| {
        AppError::validation("archive index lists fewer than three compilations")
    })?;

    let diff = diff_against_ledger(live, &ledger);
    if diff.is_noop() {
        log::info!("Latest two compilations already recorded; nothing to harvest");
        return Ok(RunSummary {
            noop: true,
            ..RunSummary::default()
        });
    }

    // Fetch each unseen compilation, oldest first. The label inside the
    // page is authoritative and replaces the index label.
    let mut plan = Vec::new();
    for entry in &diff.unseen {
        let week = retry
            .execute("compilation fetch", async || {
                let markup = client.fetch_page(&entry.url).await?;
                parse_compilation(&markup)
            })
            .await?;
        log::info!(
            "Compilation '{}': {} qualifying posting URLs",
            week.week_label,
            week.posting_urls.len()
        );
        plan.push(week);
    }

    // Phase 1: postings.
    let mut posting_scraper =
        PostingScraper::new(client, retry, &config.archive.base_url, posting_seed);
    let postings = posting_scraper.scrape_weeks(&plan).await;
    log::info!("Captured {} posting records", postings.len());

    // Phase 2: URLs embedded in the message texts.
    let mut url_scraper = MessageUrlScraper::new(client, retry, embedded_seed);
    let embedded = url_scraper.scrape_all(&postings).await?;
    log::info!("Captured {} embedded-URL records", embedded.len());

    // Tabular writes, whole lists at once. Exhaustion is fatal: losing the
    // run's records would corrupt the ledger for the next diff.
    retry
        .execute("posting table write", async || {
            store.append_postings(&postings).await
        })
        .await?;
    retry
        .execute("embedded URL table write", async || {
            store.append_embedded(&embedded).await
        })
        .await?;

    // Blob writes are best-effort.
    store_blobs(store, &postings, &embedded).await;

    Ok(RunSummary {
        noop: false,
        new_weeks: plan.len(),
        posting_records: postings.len(),
        embedded_records: embedded.len(),
    })
}

/// Persist captured markup and text, logging and swallowing per-call
/// failures. FAILURE and marker fields have no content to store.
async fn store_blobs<S: BlobStore>(
    store: &S,
    postings: &[PostingRecord],
    embedded: &[EmbeddedUrlRecord],
) {
    for record in postings {
        let id = record.sequence_id;
        put_blob(store, BlobTable::Postings, id, BlobKind::SourceCode, &record.raw_markup).await;
        put_blob(store, BlobTable::Postings, id, BlobKind::Text, &record.plain_text).await;
    }
    for record in embedded {
        let id = record.sequence_id;
        put_blob(store, BlobTable::EmbeddedUrls, id, BlobKind::SourceCode, &record.raw_markup)
            .await;
        put_blob(store, BlobTable::EmbeddedUrls, id, BlobKind::Text, &record.plain_text).await;
    }
}

async fn put_blob<S: BlobStore>(
    store: &S,
    table: BlobTable,
    id: u64,
    kind: BlobKind,
    field: &Captured<String>,
) {
    let Some(content) = field.as_value() else {
        return;
    };
    if let Err(error) = store.store_blob(table, id, kind, content).await {
        log::warn!("Blob write failed for {}/{id}_{}: {error}", table.dir(), kind.suffix());
    }
}
