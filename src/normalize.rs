//! Entry source canonicalization
//!
//! Collapses equivalent entry sources into one category: `https://a.com/`,
//! `https://a.com` and `https://a.com/?utm=x` all become `https://a.com`.
//! Normalization is best effort and never fails; anything that cannot be
//! parsed is returned as-is.

use url::Url;

/// Canonicalize a raw categorical key
///
/// - `http(s)` URLs: origin followed by the path with trailing slashes removed
///   (query and fragment are dropped)
/// - anything else: a trailing `#` or `/#` is removed
/// - unparseable URLs: returned unchanged
///
/// # Example
/// ```
/// use readytime::normalize::normalize_source;
///
/// assert_eq!(normalize_source("https://a.com/path/"), "https://a.com/path");
/// assert_eq!(normalize_source("https://a.com/"), "https://a.com");
/// assert_eq!(normalize_source("android-app://com.google/#"), "android-app://com.google");
/// ```
pub fn normalize_source(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return match Url::parse(raw) {
            Ok(url) => {
                let path = url.path().trim_end_matches('/');
                format!("{}{}", url.origin().ascii_serialization(), path)
            }
            Err(e) => {
                tracing::trace!("Keeping unparseable source {:?}: {}", raw, e);
                raw.to_string()
            }
        };
    }

    let trimmed = raw
        .strip_suffix("/#")
        .or_else(|| raw.strip_suffix('#'))
        .unwrap_or(raw);
    trimmed.to_string()
}
