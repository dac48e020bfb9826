//! Archive index and compilation page parsing.

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ArchiveEntry, ArchiveIndex, WeekPostings};

/// Anchor-text vocabulary marking a link as a job posting.
///
/// A heuristic filter, not a guarantee of precision: postings whose anchor
/// text uses none of these words are missed, and unrelated links containing
/// "position" slip through. Accepted tradeoff.
const POSTING_KEYWORDS: &[&str] = &["faculty", "professor", "position", "instructor"];

/// Parse the archive index page into a validated entry list.
///
/// Each `<li>` holding a link is one weekly compilation, newest-first.
/// Relative hrefs resolve against the index URL.
pub fn parse_archive_index(markup: &str, index_url: &str) -> Result<ArchiveIndex> {
    let document = Html::parse_document(markup);
    let base = Url::parse(index_url)?;

    let item_sel = parse_selector("li")?;
    let link_sel = parse_selector("a[href]")?;

    let mut entries = Vec::new();
    for item in document.select(&item_sel) {
        let Some(link) = item.select(&link_sel).next() else {
            continue;
        };
        let week_label = normalize_label(&item.text().collect::<String>());
        if week_label.is_empty() {
            continue;
        }
        let href = link.value().attr("href").unwrap_or("");
        let url = base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string());
        entries.push(ArchiveEntry { week_label, url });
    }

    if entries.is_empty() {
        return Err(AppError::extraction(
            "archive index",
            "no compilation entries found",
        ));
    }

    Ok(ArchiveIndex::new(entries))
}

/// Parse a compilation page into its authoritative week label and the
/// qualifying posting URLs, in document order.
pub fn parse_compilation(markup: &str) -> Result<WeekPostings> {
    let document = Html::parse_document(markup);

    // The page title is the first h2; the week label is the second.
    let heading_sel = parse_selector("h2")?;
    let week_label = document
        .select(&heading_sel)
        .nth(1)
        .map(|el| normalize_label(&el.text().collect::<String>()))
        .filter(|label| !label.is_empty())
        .ok_or_else(|| {
            AppError::extraction("compilation page", "week heading (second h2) not found")
        })?;

    let link_sel = parse_selector("a[href]")?;
    let posting_urls = document
        .select(&link_sel)
        .filter(|a| is_posting_anchor(&a.text().collect::<String>()))
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| is_secure_absolute(href))
        .map(str::to_string)
        .collect();

    Ok(WeekPostings {
        week_label,
        posting_urls,
    })
}

/// True if the anchor text reads like a job posting.
pub fn is_posting_anchor(text: &str) -> bool {
    let lower = text.to_lowercase();
    POSTING_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Only absolute https URLs qualify as posting links.
fn is_secure_absolute(href: &str) -> bool {
    Url::parse(href)
        .map(|url| url.scheme() == "https")
        .unwrap_or(false)
}

fn normalize_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_PAGE: &str = r#"
        <html><body>
        <ul>
            <li><a href="/archive/week-4">September 2024, Week 4</a></li>
            <li><a href="/archive/week-3">September 2024, Week 3</a></li>
            <li><a href="https://archive.example/week-2">September 2024, Week 2</a></li>
            <li>no link here</li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn test_parse_archive_index() {
        let index = parse_archive_index(INDEX_PAGE, "https://archive.example/index").unwrap();
        let entries = index.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].week_label, "September 2024, Week 4");
        assert_eq!(entries[0].url, "https://archive.example/archive/week-4");
        assert_eq!(entries[2].url, "https://archive.example/week-2");
    }

    #[test]
    fn test_parse_archive_index_recent_skips_current() {
        let index = parse_archive_index(INDEX_PAGE, "https://archive.example/index").unwrap();
        let recent = index.recent(2).unwrap();
        assert_eq!(recent[0].week_label, "September 2024, Week 3");
        assert_eq!(recent[1].week_label, "September 2024, Week 2");
    }

    #[test]
    fn test_parse_archive_index_empty_page() {
        assert!(parse_archive_index("<html></html>", "https://archive.example").is_err());
    }

    #[test]
    fn test_parse_compilation() {
        let markup = r#"
            <html><body>
            <h2>Weekly digest</h2>
            <h2> August 2024,
                 Week 3 </h2>
            <a href="https://x.edu/job1">Assistant Professor of Economics</a>
            <a href="https://x.edu/misc">click here</a>
            <a href="http://insecure.example/job">Lecturer Position</a>
            <a href="/relative/job">Faculty opening</a>
            <a href="https://y.edu/job2">INSTRUCTOR wanted</a>
            </body></html>
        "#;
        let week = parse_compilation(markup).unwrap();
        assert_eq!(week.week_label, "August 2024, Week 3");
        assert_eq!(
            week.posting_urls,
            vec!["https://x.edu/job1", "https://y.edu/job2"]
        );
    }

    #[test]
    fn test_parse_compilation_missing_week_heading() {
        let markup = "<html><body><h2>Only one heading</h2></body></html>";
        let error = parse_compilation(markup).unwrap_err();
        assert!(matches!(error, AppError::Extraction { .. }));
    }

    #[test]
    fn test_posting_anchor_filter() {
        assert!(is_posting_anchor("Assistant Professor of X"));
        assert!(is_posting_anchor("Lecturer Position"));
        assert!(is_posting_anchor("FACULTY opening"));
        assert!(!is_posting_anchor("click here"));
        assert!(!is_posting_anchor("unsubscribe"));
    }
}
