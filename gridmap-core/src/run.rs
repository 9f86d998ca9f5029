use gridmap_crawler::{
    FetchConfig, PageRecord, RecordFilter, Traversal, VisitStatus, build_adapter, filter,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Options for configuring a traversal run
pub struct TraverseOptions {
    pub url: String,
    pub max_depth: usize,
    pub excludes: Vec<String>,
    pub record_filter: RecordFilter,
    pub fetch: FetchConfig,
    pub show_progress_bar: bool,
}

/// Callback for reporting run-level progress
pub type RunProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Counts describing one finished traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraverseSummary {
    pub seed: String,
    pub pages_visited: usize,
    pub links_discovered: usize,
    pub links_excluded: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

/// Execute a traversal with the given options
/// Returns the run summary and the projected records
pub async fn execute_traverse(
    options: TraverseOptions,
    progress_callback: Option<RunProgressCallback>,
) -> Result<(TraverseSummary, Vec<PageRecord>), String> {
    let TraverseOptions {
        url,
        max_depth,
        excludes,
        record_filter,
        fetch,
        show_progress_bar,
    } = options;

    // Set up single progress bar for overall run progress (only if enabled)
    let progress_bar = if show_progress_bar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting traversal...");
        Some(Arc::new(pb))
    } else {
        None
    };

    // Counter for tracking visited pages
    let visited_count = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    // Progress callback for visit updates (only if progress bars enabled)
    let internal_progress_callback: gridmap_crawler::ProgressCallback = if show_progress_bar {
        let pb_clone = progress_bar.clone().unwrap();
        let count_clone = visited_count.clone();
        Arc::new(move |url: String| {
            let count = count_clone.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            pb_clone.set_message(format!(
                "Mapping... {} pages visited ({})",
                count,
                extract_url_path(&url)
            ));
            pb_clone.tick();
        })
    } else {
        // No-op callback when progress bars are disabled
        Arc::new(|_url: String| {})
    };

    let filter_policy = if excludes.is_empty() {
        filter::allow_all()
    } else {
        filter::exclude_substrings(excludes)
    };

    if let Some(ref callback) = progress_callback {
        callback(format!("Mapping {}", url));
    }

    let adapter =
        build_adapter(&fetch).map_err(|e| format!("Failed to set up fetcher: {}", e))?;

    let started = Instant::now();
    let table = Traversal::new(adapter)
        .with_max_depth(max_depth)
        .with_filter(filter_policy)
        .with_progress_callback(internal_progress_callback)
        .traverse(&url)
        .await
        .map_err(|e| format!("Failed to map {}: {}", url, e))?;
    let duration_ms = started.elapsed().as_millis() as u64;

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        let total = visited_count.load(std::sync::atomic::Ordering::Relaxed);
        pb.finish_with_message(format!("Mapping complete! {} pages visited", total));
    }

    let summary = TraverseSummary {
        seed: url,
        pages_visited: table.count_with_status(VisitStatus::Visited)
            + table.count_with_status(VisitStatus::VisitedWithError),
        links_discovered: table.len(),
        links_excluded: table.count_with_status(VisitStatus::ShouldNotVisit),
        errors: table.count_with_status(VisitStatus::VisitedWithError),
        duration_ms,
    };
    let records = table.records(record_filter);

    Ok((summary, records))
}

#[cfg(test)]
mod tests {
}
