use std::sync::Arc;
use url::Url;

/// Decides whether a discovered link may be visited. Returning false
/// marks the link `ShouldNotVisit`; the record is still kept.
pub type FilterPolicy = Arc<dyn Fn(&Url) -> bool + Send + Sync>;

pub fn allow_all() -> FilterPolicy {
    Arc::new(|_url| true)
}

/// Reject any URL containing one of the given substrings.
pub fn exclude_substrings(patterns: Vec<String>) -> FilterPolicy {
    Arc::new(move |url| {
        let candidate = url.as_str();
        !patterns.iter().any(|pattern| candidate.contains(pattern.as_str()))
    })
}
