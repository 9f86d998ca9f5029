// Report generation from traversal results

use crate::run::TraverseSummary;
use gridmap_crawler::{ErrorInfo, PageRecord, VisitStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// One seed's worth of traversal output
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: TraverseSummary,
    pub records: Vec<PageRecord>,
}

pub fn generate_text_report(reports: &[RunReport]) -> String {
    let mut report = String::new();

    // Header
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                            GRIDMAP SITE MAP REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    let total_visited: usize = reports.iter().map(|r| r.summary.pages_visited).sum();
    let total_discovered: usize = reports.iter().map(|r| r.summary.links_discovered).sum();
    let total_excluded: usize = reports.iter().map(|r| r.summary.links_excluded).sum();
    let total_errors: usize = reports.iter().map(|r| r.summary.errors).sum();

    report.push_str(&format!(
        "Generated:        {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!("Targets:          {}\n", reports.len()));
    report.push_str(&format!("Pages visited:    {}\n", total_visited));
    report.push_str(&format!("Links discovered: {}\n", total_discovered));
    report.push_str(&format!("Links excluded:   {}\n", total_excluded));
    report.push_str(&format!("Errors:           {}\n", total_errors));

    for run in reports {
        report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
        report.push_str(&format!("# {}\n", run.summary.seed));
        report.push_str(&format!(
            "  {} pages visited in {} ms\n\n",
            run.summary.pages_visited, run.summary.duration_ms
        ));

        // Group records by host, keeping first-seen host order so the
        // seed's own host leads
        let mut by_host: HashMap<String, Vec<&PageRecord>> = HashMap::new();
        let mut host_order: Vec<String> = Vec::new();

        for record in &run.records {
            if let Ok(url) = Url::parse(&record.full_url)
                && let Some(host) = url.host_str()
            {
                if !by_host.contains_key(host) {
                    host_order.push(host.to_string());
                }
                by_host.entry(host.to_string()).or_default().push(record);
            }
        }

        for host in &host_order {
            let host_records = &by_host[host];
            report.push_str(&format!("## {}\n", host));
            report.push_str(&format!("  {} links\n\n", host_records.len()));

            for record in host_records {
                report.push_str(&format_record_line(record));
                report.push('\n');
            }
            report.push('\n');
        }
    }

    // Footer
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                                 End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("\nGenerated by Gridmap - Breadth-first site mapper\n");
    report.push_str("For authorized security testing only.\n\n");

    report
}

fn format_record_line(record: &PageRecord) -> String {
    // Color code based on status
    let status_str = match record.status_code {
        Some(code @ 100..=199) => format!("\x1b[37m{}\x1b[0m", code), // White
        Some(code @ 200..=299) => format!("\x1b[32m{}\x1b[0m", code), // Green
        Some(code @ 300..=399) => format!("\x1b[36m{}\x1b[0m", code), // Cyan
        Some(code @ 400..=499) => format!("\x1b[33m{}\x1b[0m", code), // Orange/Yellow
        Some(code @ 500..=599) => format!("\x1b[31m{}\x1b[0m", code), // Red
        Some(code) => format!("{}", code),
        None => "\x1b[90m---\x1b[0m".to_string(),
    };

    let mut line = format!("  {} {}", status_str, record.path);

    // Only show the MIME type when it is not text/html; for pages, show
    // the title instead
    if let Some(ref content_type) = record.content_type
        && !content_type.starts_with("text/html")
    {
        line.push_str(&format!(" \x1b[90m{}\x1b[0m", content_type));
    } else if !record.meta.title.is_empty() {
        line.push_str(&format!(" \x1b[90m{}\x1b[0m", record.meta.title));
    }

    match record.state {
        VisitStatus::Unvisited => line.push_str(" \x1b[90m[unvisited]\x1b[0m"),
        VisitStatus::ShouldNotVisit => line.push_str(" \x1b[90m[excluded]\x1b[0m"),
        VisitStatus::VisitedWithError => {
            if let Some(ErrorInfo::Failure { ref message }) = record.error {
                line.push_str(&format!(" \x1b[31m[{}]\x1b[0m", message));
            }
        }
        _ => {}
    }

    line
}

pub fn generate_json_report(reports: &[RunReport]) -> Result<String, serde_json::Error> {
    // Create a structured JSON report with run metadata
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Gridmap",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "targets": reports.len(),
                "pages_visited": reports.iter().map(|r| r.summary.pages_visited).sum::<usize>(),
                "links_discovered": reports.iter().map(|r| r.summary.links_discovered).sum::<usize>(),
                "links_excluded": reports.iter().map(|r| r.summary.links_excluded).sum::<usize>(),
                "errors": reports.iter().map(|r| r.summary.errors).sum::<usize>()
            },
            "runs": reports
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
