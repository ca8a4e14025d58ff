//! Content conversion
//!
//! Turns rendered HTML into the representation the model is asked to read:
//! Markdown, the raw HTML, or the visible text only.

use crate::request::InputFormat;
use scraper::{Html, Selector};

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Converts page HTML to the requested input format
///
/// # Example
///
/// ```
/// use glean::engine::prepare_content;
/// use glean::InputFormat;
///
/// let html = "<html><body><h1>News</h1><p>Hello</p></body></html>";
/// let text = prepare_content(html, InputFormat::PlainText);
/// assert_eq!(text, "News\nHello");
/// ```
pub fn prepare_content(html: &str, format: InputFormat) -> String {
    match format {
        InputFormat::StructuredMarkdown => html2md::parse_html(html).trim().to_string(),
        InputFormat::RawHtml => html.to_string(),
        InputFormat::PlainText => extract_text(html),
    }
}

/// Extracts the visible text of a document's `<body>`
///
/// Each text node becomes its own line; whitespace inside a line is
/// collapsed and empty lines are dropped.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}
