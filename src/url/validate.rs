use crate::url::RECOGNIZED_PREFIXES;
use crate::UrlError;

/// Validates a target URL before any network activity
///
/// # Validation Rules
///
/// 1. A recognized prefix written twice in a row (`https://https://...`) is
///    rejected with a duplicate-protocol diagnostic that suggests the
///    de-duplicated URL
/// 2. A URL that does not start with a recognized prefix is rejected with a
///    missing-protocol diagnostic listing the accepted prefixes
/// 3. Anything else is returned unchanged
///
/// The check is purely syntactic.
///
/// # Arguments
///
/// * `url` - The candidate URL as typed by the user
///
/// # Returns
///
/// * `Ok(&str)` - The input, unchanged
/// * `Err(UrlError)` - The URL is malformed
///
/// # Examples
///
/// ```
/// use glean::url::validate_url;
///
/// assert_eq!(validate_url("https://example.com").unwrap(), "https://example.com");
/// assert!(validate_url("example.com").is_err());
/// assert!(validate_url("https://https://example.com").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<&str, UrlError> {
    for prefix in RECOGNIZED_PREFIXES {
        let doubled = format!("{}{}", prefix, prefix);
        if url.contains(&doubled) {
            return Err(UrlError::DuplicateProtocol {
                url: url.to_string(),
                suggestion: url.replacen(&doubled, prefix, 1),
            });
        }
    }

    if !RECOGNIZED_PREFIXES.iter().any(|p| url.starts_with(p)) {
        return Err(UrlError::MissingProtocol {
            url: url.to_string(),
        });
    }

    Ok(url)
}

pub(crate) fn duplicate_protocol_message(url: &str, suggestion: &str) -> String {
    format!(
        "Duplicate protocol in URL: {url}\n\
         \n\
         The scheme prefix appears twice. Did you mean:\n\
         \x20 ✗ {url}\n\
         \x20 ✓ {suggestion}"
    )
}

pub(crate) fn missing_protocol_message(url: &str) -> String {
    format!(
        "URL is missing a protocol: {url}\n\
         \n\
         The URL must start with one of: {prefixes}\n\
         \n\
         Examples:\n\
         \x20 ✗ {url}\n\
         \x20 ✓ https://{url}\n\
         \x20 ✓ http://localhost:8000/blog\n\
         \x20 ✓ file:///home/me/saved-page.html\n\
         \x20 ✓ raw:<html><body>...</body></html>",
        prefixes = RECOGNIZED_PREFIXES.join(", ")
    )
}
