//! Link resolution and filtering.
//!
//! Pure functions used by the crawler to turn raw `href` values into
//! absolute URLs and to decide whether they may be followed.

use url::{ParseError, Url};

/// Resolve a possibly-relative `href` against the page it was found on.
///
/// Absolute hrefs are returned as parsed; relative ones are joined against
/// `page` using standard URL resolution. Empty or malformed hrefs yield
/// `None` and are dropped by the caller.
pub fn resolve(page: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => page.join(href).ok(),
        Err(_) => None,
    }
}

/// True if `candidate` shares the seed's origin (scheme, host and port).
///
/// Hosts are compared after the URL parser has lowercased them and default
/// ports are treated as equal to an explicit default port. Paths, queries
/// and trailing slashes are ignored.
pub fn same_origin(seed: &Url, candidate: &Url) -> bool {
    seed.origin() == candidate.origin()
}

/// Only `http` and `https` URLs are followed.
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
