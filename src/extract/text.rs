//! Plain-text extraction from raw page markup.

use scraper::{ElementRef, Html};

/// Elements whose contents are boilerplate, never message text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "head", "template", "title"];

/// Elements that end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "table", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section",
    "article", "header", "footer", "blockquote", "pre",
];

/// Convert raw rendered-page markup into normalized plain text.
///
/// Strips markup and boilerplate, breaks lines at block boundaries, and
/// collapses runs of whitespace. Already-plain input passes through with
/// only whitespace normalization, so call sites may safely re-apply it to
/// pre-extracted text.
pub fn extract_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut raw = String::new();
    collect(document.root_element(), &mut raw);
    normalize(&raw)
}

fn collect(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            collect(el, out);
        }
    }

    if BLOCK_TAGS.contains(&name) {
        out.push('\n');
    }
}

fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup() {
        let markup = "<html><body><p>Assistant  Professor</p><p>of Economics</p></body></html>";
        assert_eq!(extract_text(markup), "Assistant Professor\nof Economics");
    }

    #[test]
    fn test_skips_script_and_style() {
        let markup = concat!(
            "<html><head><style>p { color: red; }</style></head>",
            "<body><script>var x = 1;</script><p>Visible</p></body></html>",
        );
        assert_eq!(extract_text(markup), "Visible");
    }

    #[test]
    fn test_br_breaks_line() {
        let markup = "<body>first line<br>second line</body>";
        assert_eq!(extract_text(markup), "first line\nsecond line");
    }

    #[test]
    fn test_plain_input_passes_through() {
        let plain = "Salary range: $85,000 per year.";
        assert_eq!(extract_text(plain), plain);
        // A second application changes nothing further.
        assert_eq!(extract_text(&extract_text(plain)), plain);
    }

    #[test]
    fn test_collapses_whitespace() {
        let markup = "<p>too   many\t spaces</p>\n\n<p>  and blank lines </p>";
        assert_eq!(extract_text(markup), "too many spaces\nand blank lines");
    }
}
