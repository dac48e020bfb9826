//! Archive index structures.

use serde::{Deserialize, Serialize};

/// One weekly compilation as listed on the archive index page.
///
/// Ephemeral: fetched fresh each run, never persisted. The label printed on
/// the index may differ in formatting from the one inside the compilation
/// page; the inside-page label is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Human-formatted week label, e.g. "August 2024, Week 3"
    pub week_label: String,

    /// Absolute URL of the compilation page
    pub url: String,
}

/// Validated, ordered view of the archive index page.
///
/// Entries are newest-first; the first entry is the current (unfinished)
/// week and is never harvested.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveIndex {
    /// Build an index from entries in newest-first page order.
    pub fn new(entries: Vec<ArchiveEntry>) -> Self {
        Self { entries }
    }

    /// All entries, newest-first, including the current week.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// The `limit` most recent completed entries, newest-first, skipping the
    /// current (unfinished) week. `None` if the index is too short.
    pub fn recent(&self, limit: usize) -> Option<&[ArchiveEntry]> {
        self.entries.get(1..1 + limit)
    }
}

/// Ordered sequence of previously recorded week labels.
///
/// Deduplicated, insertion order = chronological. The last two entries are
/// the two most recently fully-processed compilations. Read-only to the
/// harvest core.
#[derive(Debug, Clone, Default)]
pub struct KnownWeeksLedger {
    labels: Vec<String>,
}

impl KnownWeeksLedger {
    /// Build a ledger from raw per-row labels, deduplicating while keeping
    /// first-seen order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for label in labels {
            let label = label.into();
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        Self { labels: seen }
    }

    /// Most recently recorded week label.
    pub fn last_known(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }

    /// Second most recently recorded week label.
    pub fn second_to_last_known(&self) -> Option<&str> {
        self.labels
            .len()
            .checked_sub(2)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A newly discovered compilation with its qualifying posting URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekPostings {
    /// Authoritative week label read from inside the compilation page
    pub week_label: String,

    /// Posting URLs in document order
    pub posting_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str) -> ArchiveEntry {
        ArchiveEntry {
            week_label: label.to_string(),
            url: format!("https://archive.example/{}", label.replace(' ', "_")),
        }
    }

    #[test]
    fn test_recent_skips_current_week() {
        let index = ArchiveIndex::new(vec![entry("W4"), entry("W3"), entry("W2"), entry("W1")]);
        let recent = index.recent(2).unwrap();
        assert_eq!(recent[0].week_label, "W3");
        assert_eq!(recent[1].week_label, "W2");
    }

    #[test]
    fn test_recent_too_short() {
        let index = ArchiveIndex::new(vec![entry("W1"), entry("W2")]);
        assert!(index.recent(2).is_none());
    }

    #[test]
    fn test_ledger_dedups_in_order() {
        let ledger = KnownWeeksLedger::from_labels(["W1", "W1", "W2", "W2", "W2", "W3"]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.last_known(), Some("W3"));
        assert_eq!(ledger.second_to_last_known(), Some("W2"));
    }

    #[test]
    fn test_ledger_short() {
        let ledger = KnownWeeksLedger::from_labels(["W1"]);
        assert_eq!(ledger.last_known(), Some("W1"));
        assert_eq!(ledger.second_to_last_known(), None);

        let empty = KnownWeeksLedger::default();
        assert_eq!(empty.last_known(), None);
    }
}
