//! URL handling module for Glean
//!
//! This module provides pre-flight URL validation with corrective
//! diagnostics, and the URL sanitizing used to derive artifact filenames.

mod sanitize;
pub(crate) mod validate;

// Re-export main functions
pub use sanitize::{sanitize_url, strip_scheme};
pub use validate::validate_url;

/// Scheme prefixes the renderer knows how to load, in display order
pub const RECOGNIZED_PREFIXES: [&str; 4] = ["http://", "https://", "file://", "raw:"];

/// The kind of source a validated URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlScheme {
    /// Remote page over HTTP or HTTPS
    Web,
    /// Local file on disk (`file://`)
    File,
    /// Inline HTML carried in the URL itself (`raw:`)
    Raw,
}

impl UrlScheme {
    /// Detects the scheme of a URL from its prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use glean::url::UrlScheme;
    ///
    /// assert_eq!(UrlScheme::detect("https://example.com"), Some(UrlScheme::Web));
    /// assert_eq!(UrlScheme::detect("raw:<p>hi</p>"), Some(UrlScheme::Raw));
    /// assert_eq!(UrlScheme::detect("example.com"), None);
    /// ```
    pub fn detect(url: &str) -> Option<Self> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Some(Self::Web)
        } else if url.starts_with("file://") {
            Some(Self::File)
        } else if url.starts_with("raw:") {
            Some(Self::Raw)
        } else {
            None
        }
    }

    /// Returns true if loading this URL touches the network
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Web)
    }
}
