//! Embedded-URL capture.
//!
//! Scans each successfully captured posting's message text for URLs and
//! fetches every one of them, in document order, tagging each with the
//! salary signal. Postings with FAILURE or absent text contribute nothing.
//!
//! Unlike posting capture there is no sentinel fallback here: fetch
//! exhaustion propagates and aborts the run.

use chrono::Utc;

use crate::error::Result;
use crate::extract::{detect_salary, extract_text, extract_urls};
use crate::fetch::FetchClient;
use crate::models::{Captured, EmbeddedUrlRecord, PostingRecord};
use crate::pipeline::retry::RetryPolicy;

/// Scraper turning posting records into embedded-URL records.
pub struct MessageUrlScraper<'a> {
    client: &'a dyn FetchClient,
    retry: RetryPolicy,
    next_id: u64,
}

impl<'a> MessageUrlScraper<'a> {
    /// `seed` is the number of records already in the embedded-URL table.
    pub fn new(client: &'a dyn FetchClient, retry: RetryPolicy, seed: u64) -> Self {
        Self {
            client,
            retry,
            next_id: seed + 1,
        }
    }

    /// Capture every URL embedded in the postings' message texts.
    pub async fn scrape_all(&mut self, postings: &[PostingRecord]) -> Result<Vec<EmbeddedUrlRecord>> {
        let mut records = Vec::new();
        for posting in postings {
            let Some(text) = posting.plain_text.as_value() else {
                continue;
            };

            for url in extract_urls(text) {
                records.push(self.scrape_embedded(posting, &url).await?);
            }
        }
        Ok(records)
    }

    async fn scrape_embedded(
        &mut self,
        posting: &PostingRecord,
        url: &str,
    ) -> Result<EmbeddedUrlRecord> {
        let retry = self.retry;
        let (markup, text, salary) = retry
            .execute("embedded URL fetch", async || {
                let markup = self.client.fetch_page(url).await?;
                let text = extract_text(&markup);
                let salary = detect_salary(&text);
                Ok((markup, text, salary))
            })
            .await?;

        let sequence_id = self.allocate_id();
        log::info!(
            "Embedded URL {sequence_id} captured from {url} (posting {}, salary: {salary})",
            posting.sequence_id
        );

        Ok(EmbeddedUrlRecord {
            posting_sequence_id: posting.sequence_id,
            sequence_id,
            week_label: posting.week_label.clone(),
            posting_source_url: posting.source_url.clone(),
            embedded_url: url.to_string(),
            captured_at: Utc::now(),
            has_salary_signal: Captured::Value(salary),
            raw_markup: Captured::Value(markup),
            plain_text: Captured::Value(text),
        })
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetch::testing::FakeClient;

    fn posting(id: u64, week: &str, text: Captured<String>) -> PostingRecord {
        PostingRecord {
            sequence_id: id,
            week_label: week.to_string(),
            source_url: Some(format!("https://archive.example/posting/{id}")),
            captured_at: Utc::now(),
            has_salary_signal: match &text {
                Captured::Value(_) => Captured::Value(false),
                Captured::Failure => Captured::Failure,
                Captured::Absent => Captured::Absent,
            },
            raw_markup: text.clone(),
            plain_text: text,
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_embedded_urls_captured_in_document_order() {
        let client = FakeClient::new()
            .with_page("https://a.example/one", "<p>stipend of $3,000</p>")
            .with_page("https://b.example/two", "<p>campus map</p>");

        let text = "Apply at https://a.example/one and see https://b.example/two today.";
        let postings = vec![posting(7, "W1", Captured::Value(text.to_string()))];

        let mut scraper = MessageUrlScraper::new(&client, fast_retry(2), 20);
        let records = scraper.scrape_all(&postings).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence_id, 21);
        assert_eq!(records[0].posting_sequence_id, 7);
        assert_eq!(records[0].embedded_url, "https://a.example/one");
        assert_eq!(records[0].has_salary_signal, Captured::Value(true));
        assert_eq!(records[1].sequence_id, 22);
        assert_eq!(records[1].embedded_url, "https://b.example/two");
        assert_eq!(records[1].has_salary_signal, Captured::Value(false));
    }

    #[tokio::test]
    async fn test_failure_and_marker_postings_contribute_nothing() {
        let client = FakeClient::new();
        let postings = vec![
            posting(1, "W1", Captured::Failure),
            posting(2, "W1", Captured::Absent),
        ];

        let mut scraper = MessageUrlScraper::new(&client, fast_retry(2), 0);
        let records = scraper.scrape_all(&postings).await.unwrap();

        assert!(records.is_empty());
        assert!(client.fetched_urls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_exhaustion_is_fatal() {
        let client = FakeClient::new().with_failing_page("https://dead.example/x");
        let text = "Details: https://dead.example/x";
        let postings = vec![posting(1, "W1", Captured::Value(text.to_string()))];

        let mut scraper = MessageUrlScraper::new(&client, fast_retry(3), 0);
        let error = scraper.scrape_all(&postings).await.unwrap_err();
        assert!(error.is_exhausted());
    }

    #[tokio::test]
    async fn test_duplicate_urls_each_get_a_record() {
        let client = FakeClient::new().with_page("https://a.example/one", "ok");
        let text = "https://a.example/one then https://a.example/one again";
        let postings = vec![posting(3, "W2", Captured::Value(text.to_string()))];

        let mut scraper = MessageUrlScraper::new(&client, fast_retry(1), 0);
        let records = scraper.scrape_all(&postings).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].embedded_url, records[1].embedded_url);
        assert_eq!(records[0].sequence_id, 1);
        assert_eq!(records[1].sequence_id, 2);
    }
}
