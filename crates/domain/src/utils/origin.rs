//! URL origin extraction
//!
//! Capture cycles compare the origin of the active tab with the origin of
//! every mapping URL. Unparseable input is passed through untouched so that a
//! garbage URL simply never matches.

use tracing::debug;
use url::Url;

/// Return the origin (`scheme://host[:port]`) of `url`, or `url` itself if
/// it cannot be parsed.
///
/// Default ports are elided, matching the browser's `URL.origin`.
///
/// ```
/// use snaptrack_domain::utils::origin::extract_domain;
///
/// assert_eq!(extract_domain("https://a.b.com/path?x=1"), "https://a.b.com");
/// assert_eq!(extract_domain("not a url"), "not a url");
/// ```
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(err) => {
            debug!(url, error = %err, "unparseable url, using raw value");
            url.to_string()
        }
    }
}

/// True for absolute `http`/`https` URLs that name a host.
pub fn is_http_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https")
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    })
}
