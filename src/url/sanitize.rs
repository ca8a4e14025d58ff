use crate::url::RECOGNIZED_PREFIXES;

/// Maximum length of a sanitized URL, in characters
pub const MAX_SANITIZED_LEN: usize = 50;

/// Returns the part of a URL after its recognized scheme prefix
///
/// URLs without a recognized prefix are returned as-is.
pub fn strip_scheme(url: &str) -> &str {
    RECOGNIZED_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))
        .unwrap_or(url)
}

/// Turns a URL into a filesystem-friendly fragment
///
/// The scheme is dropped, every run of non-word characters (anything other
/// than a Unicode letter, digit or `_`) collapses to a single `_`, and the
/// result is truncated to [`MAX_SANITIZED_LEN`] characters.
///
/// # Examples
///
/// ```
/// use glean::url::sanitize_url;
///
/// assert_eq!(sanitize_url("https://example.com/blog/"), "example_com_blog_");
/// ```
pub fn sanitize_url(url: &str) -> String {
    let mut out = String::new();
    let mut in_separator = false;

    for c in strip_scheme(url).chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }

    out.chars().take(MAX_SANITIZED_LEN).collect()
}
