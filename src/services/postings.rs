//! Posting capture.
//!
//! For each new compilation, fetches every posting page, follows its
//! message link (plain-text first, HTML fallback), extracts the message
//! text, and flags salary mentions. A posting whose fetch exhausts the
//! retry budget becomes a FAILURE-sentinel record instead of aborting the
//! batch; a week with zero qualifying URLs becomes a single marker record
//! so the week still lands in the ledger.

use chrono::Utc;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::extract::{detect_salary, extract_text};
use crate::fetch::FetchClient;
use crate::models::{Captured, PostingRecord, WeekPostings};
use crate::pipeline::retry::RetryPolicy;

/// Where a posting page keeps its message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLocation {
    /// Link to the plain-text rendering (preferred tier)
    PlainText(String),
    /// Link to the HTML rendering (fallback tier)
    Html(String),
    /// Neither link present
    NotFound,
}

/// Locate the message-body link on a posting page.
///
/// The plain-text link wins when both are present; relative hrefs resolve
/// against the archive base URL. Only a genuinely absent plain-text link
/// triggers the HTML fallback; fetch faults surface as errors instead.
pub fn locate_message(markup: &str, base_url: &str) -> Result<MessageLocation> {
    let document = Html::parse_document(markup);
    let link_sel = parse_selector("a[href]")?;

    let mut html_href = None;
    for anchor in document.select(&link_sel) {
        let text = anchor.text().collect::<String>().to_lowercase();
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if text.contains("text/plain") {
            return Ok(MessageLocation::PlainText(resolve(base_url, href)));
        }
        if html_href.is_none() && text.contains("text/html") {
            html_href = Some(resolve(base_url, href));
        }
    }

    Ok(match html_href {
        Some(href) => MessageLocation::Html(href),
        None => MessageLocation::NotFound,
    })
}

fn resolve(base_url: &str, href: &str) -> String {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Everything captured from one posting's message page.
struct MessageCapture {
    markup: String,
    text: String,
    salary: bool,
}

/// Scraper turning a harvest plan into posting records.
pub struct PostingScraper<'a> {
    client: &'a dyn FetchClient,
    retry: RetryPolicy,
    base_url: &'a str,
    next_id: u64,
}

impl<'a> PostingScraper<'a> {
    /// `seed` is the number of records already in the posting table; ids
    /// continue from there.
    pub fn new(
        client: &'a dyn FetchClient,
        retry: RetryPolicy,
        base_url: &'a str,
        seed: u64,
    ) -> Self {
        Self {
            client,
            retry,
            base_url,
            next_id: seed + 1,
        }
    }

    /// Scrape every posting in the plan, in (week, document) order.
    pub async fn scrape_weeks(&mut self, weeks: &[WeekPostings]) -> Vec<PostingRecord> {
        let mut records = Vec::new();
        for week in weeks {
            if week.posting_urls.is_empty() {
                log::info!(
                    "Week '{}' has no qualifying posting URLs; recording marker",
                    week.week_label
                );
                records.push(self.empty_week_marker(&week.week_label));
                continue;
            }

            for url in &week.posting_urls {
                records.push(self.scrape_posting(&week.week_label, url).await);
            }
        }
        records
    }

    /// Capture one posting. Retry exhaustion yields a FAILURE-sentinel
    /// record rather than an error: one unreachable posting must never
    /// abort the batch.
    async fn scrape_posting(&mut self, week_label: &str, url: &str) -> PostingRecord {
        let retry = self.retry;
        let captured = retry
            .execute("posting message fetch", async || {
                self.capture_message(url).await
            })
            .await;

        let sequence_id = self.allocate_id();
        match captured {
            Ok(capture) => {
                log::info!(
                    "Posting {sequence_id} captured from {url} (salary: {})",
                    capture.salary
                );
                PostingRecord {
                    sequence_id,
                    week_label: week_label.to_string(),
                    source_url: Some(url.to_string()),
                    captured_at: Utc::now(),
                    has_salary_signal: Captured::Value(capture.salary),
                    raw_markup: Captured::Value(capture.markup),
                    plain_text: Captured::Value(capture.text),
                }
            }
            Err(error) => {
                log::error!("Posting capture failed for {url}: {error}");
                PostingRecord {
                    sequence_id,
                    week_label: week_label.to_string(),
                    source_url: Some(url.to_string()),
                    captured_at: Utc::now(),
                    has_salary_signal: Captured::Failure,
                    raw_markup: Captured::Failure,
                    plain_text: Captured::Failure,
                }
            }
        }
    }

    /// Fetch the posting page, follow the message link (plain-text tier
    /// first, HTML second), and extract text and salary signal.
    async fn capture_message(&self, posting_url: &str) -> Result<MessageCapture> {
        let posting_markup = self.client.fetch_page(posting_url).await?;

        let message_url = match locate_message(&posting_markup, self.base_url)? {
            MessageLocation::PlainText(url) => url,
            MessageLocation::Html(url) => {
                log::debug!("No plain-text link on {posting_url}; using HTML message");
                url
            }
            MessageLocation::NotFound => {
                return Err(AppError::extraction(
                    posting_url,
                    "no text/plain or text/html message link",
                ));
            }
        };

        let markup = self.client.fetch_page(&message_url).await?;
        let text = extract_text(&markup);
        let salary = detect_salary(&text);
        Ok(MessageCapture {
            markup,
            text,
            salary,
        })
    }

    /// Marker record for a week that yielded zero posting URLs. Keeps the
    /// week in the ledger so later runs diff correctly.
    fn empty_week_marker(&mut self, week_label: &str) -> PostingRecord {
        PostingRecord {
            sequence_id: self.allocate_id(),
            week_label: week_label.to_string(),
            source_url: None,
            captured_at: Utc::now(),
            has_salary_signal: Captured::Absent,
            raw_markup: Captured::Absent,
            plain_text: Captured::Absent,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
