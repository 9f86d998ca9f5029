use crate::error::{CrawlError, Result};
use crate::extract::{self, AnchorLink};
use crate::fetch::{FetchAdapter, FetchConfig, build_adapter};
use crate::filter::{self, FilterPolicy};
use crate::record::{ErrorInfo, LinkRecord, VisitStatus};
use crate::table::{DepthFrontier, LinkTable};
use crate::urls;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Map a site breadth-first from a seed and return the link table.
pub async fn traverse(seed: &str, max_depth: usize, config: &FetchConfig) -> Result<LinkTable> {
    let adapter = build_adapter(config)?;
    Traversal::new(adapter)
        .with_max_depth(max_depth)
        .traverse(seed)
        .await
}

/// Breadth-first frontier scheduler.
///
/// Visits run depth by depth, one page at a time, awaiting each network
/// operation before the next. A depth is only entered once every visit
/// at the previous depth has finished, so a record's depth is always
/// the length of the shortest discovery chain that reached it.
pub struct Traversal {
    adapter: Arc<dyn FetchAdapter>,
    table: LinkTable,
    frontier: DepthFrontier,
    max_depth: usize,
    root_host: String,
    filter: FilterPolicy,
    progress_callback: Option<ProgressCallback>,
}

impl Traversal {
    pub fn new(adapter: Arc<dyn FetchAdapter>) -> Self {
        Self {
            adapter,
            table: LinkTable::new(),
            frontier: DepthFrontier::new(),
            max_depth: 3,
            root_host: String::new(),
            filter: filter::allow_all(),
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_filter(mut self, filter: FilterPolicy) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk the site from the seed. The only error this returns is a
    /// seed URL that cannot be parsed; everything that goes wrong after
    /// registration is recorded on the affected record instead.
    pub async fn traverse(mut self, seed: &str) -> Result<LinkTable> {
        let seed_url = Url::parse(seed)
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", seed, e)))?;
        self.root_host = seed_url
            .host_str()
            .ok_or_else(|| CrawlError::InvalidUrl(format!("{}: no host", seed)))?
            .to_string();

        info!("Starting traversal of {} to depth {}", seed, self.max_depth);

        let seed_key = urls::canonical_key(&seed_url);
        let base_key = urls::canonical_key_without_query(&seed_url);
        let record = LinkRecord::new(seed_url.clone(), seed.to_string(), None, 0, true);
        self.table.insert(record, base_key);

        if !urls::is_crawlable(&seed_url) {
            if let Some(record) = self.table.get_mut(&seed_key) {
                record.exclude();
            }
            return Ok(self.table);
        }
        // The seed goes through the same gate as every discovered link
        if !(self.filter)(&seed_url) {
            debug!("Filtered: {}", seed_url);
            if let Some(record) = self.table.get_mut(&seed_key) {
                record.exclude();
            }
            return Ok(self.table);
        }
        if self.max_depth == 0 {
            return Ok(self.table);
        }

        self.visit(&seed_key, 0).await;

        // Children discovered while visiting depth d-1 wait at frontier
        // level d, grouped under the parent that found them.
        for depth in 1..self.max_depth {
            if self.frontier.is_empty_at(depth) {
                break;
            }
            for (parent_key, children) in self.frontier.level(depth) {
                self.correlate_anchors(&parent_key, &children).await;
                for child_key in children {
                    self.visit(&child_key, depth).await;
                }
            }
        }

        if let Err(e) = self.adapter.close().await {
            warn!("Error closing fetch adapter: {}", e);
        }

        info!(
            "Traversal complete. {} links recorded, {} visited",
            self.table.len(),
            self.table.count_with_status(VisitStatus::Visited)
        );
        Ok(self.table)
    }

    /// Visit one record: probe its headers, then for an internal HTML
    /// page that answered 2xx/3xx, download the body, extract metadata
    /// and discover children. Failures never escape this method.
    async fn visit(&mut self, key: &str, depth: usize) {
        let url = {
            let Some(record) = self.table.get_mut(key) else {
                return;
            };
            // The frontier never queues past the bound, but a record
            // handed in beyond it must not be fetched.
            if depth >= self.max_depth {
                record.exclude();
                return;
            }
            if !record.begin_visit() {
                return;
            }
            record.url.clone()
        };

        if let Some(callback) = &self.progress_callback {
            callback(url.to_string());
        }

        let adapter = self.adapter.clone();
        let probe = match adapter.fetch_headers(&url).await {
            Ok(probe) => probe,
            Err(e) => {
                self.record_failure(
                    key,
                    &url,
                    ErrorInfo::Failure {
                        message: e.to_string(),
                    },
                );
                return;
            }
        };

        if probe.status_code >= 400 {
            if !(self.filter)(&url) {
                debug!(
                    "Suppressing HTTP {} for filtered link {}",
                    probe.status_code, url
                );
                return;
            }
            if let Some(record) = self.table.get_mut(key) {
                record.status_code = Some(probe.status_code);
                record.status_text = Some(probe.status_text.clone());
                record.content_type = probe.content_type.clone();
                record.finish_with_error(ErrorInfo::HttpStatus {
                    code: probe.status_code,
                });
            }
            return;
        }

        let (internal, fetchable) = {
            let Some(record) = self.table.get_mut(key) else {
                return;
            };
            record.status_code = Some(probe.status_code);
            record.status_text = Some(probe.status_text.clone());
            record.content_type = probe.content_type.clone();

            let html_like = probe
                .content_type
                .as_deref()
                .map(urls::is_html_content_type)
                .unwrap_or(false);
            let fetchable =
                record.internal && html_like && (200..400).contains(&probe.status_code);
            (record.internal, fetchable)
        };

        if !fetchable {
            debug!("Probe only for {} (internal: {})", url, internal);
            if let Some(record) = self.table.get_mut(key) {
                record.finish_visited();
            }
            return;
        }

        match adapter.fetch_page(&url).await {
            Ok(body) => {
                let anchors = extract::extract_links(&body);
                if let Some(record) = self.table.get_mut(key) {
                    extract::extract_meta(&body, &mut record.meta);
                }
                for anchor in &anchors {
                    self.discover(anchor, key, &url, depth);
                }
                if let Some(record) = self.table.get_mut(key) {
                    record.finish_visited();
                }
            }
            Err(e) => {
                self.record_failure(
                    key,
                    &url,
                    ErrorInfo::Failure {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    /// Handle one anchor found on a page at `parent_depth`: merge it
    /// into the record it already has, fold a query variant into its
    /// base record, or create a new record and queue it a level deeper.
    fn discover(
        &mut self,
        anchor: &AnchorLink,
        parent_key: &str,
        parent_url: &Url,
        parent_depth: usize,
    ) {
        let Some(resolved) = urls::resolve(&anchor.href, parent_url) else {
            return;
        };

        let text = (!anchor.text.is_empty()).then_some(anchor.text.as_str());
        let key = urls::canonical_key(&resolved);
        if self.table.contains(&key) {
            self.table
                .merge_encounter(&key, &anchor.href, text, Some(&anchor.href));
            return;
        }

        let base_key = urls::canonical_key_without_query(&resolved);
        if let Some(existing) = self.table.find_by_base(&base_key) {
            let existing = existing.to_string();
            self.table
                .merge_encounter(&existing, &anchor.href, text, Some(&anchor.href));
            return;
        }

        let child_depth = parent_depth + 1;
        let internal = urls::is_internal(&resolved, &self.root_host);
        let crawlable = urls::is_crawlable(&resolved);
        let allowed = (self.filter)(&resolved);

        let mut record = LinkRecord::new(
            resolved,
            anchor.href.clone(),
            Some(parent_key.to_string()),
            child_depth,
            internal,
        );
        record.links_text = text.map(str::to_string);
        record.href = Some(anchor.href.clone());

        if !crawlable {
            debug!("Not crawlable: {}", record.url);
            record.exclude();
            self.table.insert(record, base_key);
            return;
        }
        if !allowed {
            debug!("Filtered: {}", record.url);
            record.exclude();
            self.table.insert(record, base_key);
            return;
        }

        let key = record.key.clone();
        self.table.insert(record, base_key);
        self.frontier.enqueue(child_depth, parent_key, key);
    }

    /// Fetch a parent once more to pair its anchors with the child
    /// records it produced. Anchors match children by path; the anchor
    /// text and href fill in where the child has none yet.
    async fn correlate_anchors(&mut self, parent_key: &str, children: &[String]) {
        let parent_url = match self.table.get(parent_key) {
            Some(record) => record.url.clone(),
            None => return,
        };
        let body = match self.adapter.fetch_page(&parent_url).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Skipping anchor correlation for {}: {}", parent_key, e);
                return;
            }
        };

        for anchor in extract::extract_links(&body) {
            let Some(resolved) = urls::resolve(&anchor.href, &parent_url) else {
                continue;
            };
            for child_key in children {
                let Some(child) = self.table.get_mut(child_key) else {
                    continue;
                };
                if child.url.path() == resolved.path() {
                    if child.links_text.is_none() && !anchor.text.is_empty() {
                        child.links_text = Some(anchor.text.clone());
                    }
                    if child.href.is_none() {
                        child.href = Some(anchor.href.clone());
                    }
                }
            }
        }
    }

    /// Record a failed visit. Errors on links the filter would have
    /// rejected anyway are logged and dropped, leaving the record
    /// without a fetch result.
    fn record_failure(&mut self, key: &str, url: &Url, error: ErrorInfo) {
        if !(self.filter)(url) {
            debug!("Suppressing error for filtered link {}: {:?}", url, error);
            return;
        }
        if let Some(record) = self.table.get_mut(key) {
            record.finish_with_error(error);
        }
    }
}
