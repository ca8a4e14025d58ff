//! Token-bounded content chunking
//!
//! Tokens are approximated by whitespace-separated words. Chunks are slices
//! of the original text, so line breaks and Markdown structure survive.

/// Splits content into chunks of at most `threshold` tokens
///
/// Consecutive chunks share `floor(threshold * overlap_rate)` tokens. The
/// window always advances by at least one token, so an overlap rate of 1.0
/// still terminates. Blank content yields no chunks.
///
/// # Example
///
/// ```
/// use glean::engine::chunk_content;
///
/// let chunks = chunk_content("a b c d e", 2, 0.5);
/// assert_eq!(chunks, vec!["a b", "b c", "c d", "d e"]);
/// ```
pub fn chunk_content(content: &str, threshold: usize, overlap_rate: f64) -> Vec<&str> {
    let spans = word_spans(content);
    if spans.is_empty() {
        return Vec::new();
    }

    let threshold = threshold.max(1);
    let overlap = (threshold as f64 * overlap_rate.clamp(0.0, 1.0)).floor() as usize;
    let step = threshold.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + threshold).min(spans.len());
        chunks.push(&content[spans[start].0..spans[end - 1].1]);
        if end == spans.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Byte ranges of the whitespace-separated words in `text`
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        spans.push((s, text.len()));
    }

    spans
}
