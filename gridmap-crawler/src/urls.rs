use url::Url;

/// Resolve a raw href against the page it appeared on.
///
/// Absolute references parse directly. Anything else is treated as
/// site-root-relative: a bare path like `about.html` gets a leading `/`
/// before joining, so it resolves against the host root rather than the
/// parent's directory. Fragments are always stripped. Returns `None`
/// only for references that cannot name a page at all (empty strings
/// and strings the URL parser rejects outright).
pub fn resolve(raw: &str, base: &Url) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(mut absolute) = Url::parse(trimmed) {
        absolute.set_fragment(None);
        return Some(absolute);
    }

    // Query-only and fragment-only references keep their meaning
    // relative to the page itself; everything else is rooted.
    let candidate = if trimmed.starts_with('/')
        || trimmed.starts_with('?')
        || trimmed.starts_with('#')
    {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    let mut resolved = base.join(&candidate).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

/// Canonical identity of a page: the normalized URL string with the
/// fragment removed. Two references that produce the same key are the
/// same page as far as the link table is concerned.
pub fn canonical_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Secondary identity with the query string also removed. Used to fold
/// `/page?a=1` into an already-known `/page` instead of recording it
/// as a new page.
pub fn canonical_key_without_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.set_query(None);
    url.to_string()
}

/// A link is internal when its host matches the traversal root's host
/// exactly. Subdomains count as external.
pub fn is_internal(url: &Url, root_host: &str) -> bool {
    url.host_str().map(|host| host == root_host).unwrap_or(false)
}

/// Only http and https pages can be fetched. mailto:, tel:, javascript:
/// and friends are recorded but never visited.
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Whether a content type header describes an HTML document.
pub fn is_html_content_type(content_type: &str) -> bool {
    let normalized = content_type.to_lowercase();
    normalized.starts_with("text/html") || normalized.starts_with("application/xhtml+xml")
}

/// The path component shown in reports, with the empty path displayed
/// as "/".
pub fn url_path(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
