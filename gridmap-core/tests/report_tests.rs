// Tests for report generation functionality

use gridmap_core::report::{
    ReportFormat, RunReport, generate_json_report, generate_text_report, save_report,
};
use gridmap_core::run::TraverseSummary;
use gridmap_crawler::{ErrorInfo, PageMeta, PageRecord, VisitStatus};

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    let format = ReportFormat::from_str("text");
    assert!(matches!(format, Some(ReportFormat::Text)));
}

#[test]
fn test_report_format_from_str_json() {
    let format = ReportFormat::from_str("json");
    assert!(matches!(format, Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(
        ReportFormat::from_str("TEXT"),
        Some(ReportFormat::Text)
    ));
    assert!(matches!(
        ReportFormat::from_str("Json"),
        Some(ReportFormat::Json)
    ));
}

#[test]
fn test_report_format_from_str_invalid() {
    let format = ReportFormat::from_str("invalid");
    assert!(format.is_none());

    let format = ReportFormat::from_str("csv");
    assert!(format.is_none());
}

// ============================================================================
// Report Data Helpers
// ============================================================================

fn summary(seed: &str) -> TraverseSummary {
    TraverseSummary {
        seed: seed.to_string(),
        pages_visited: 2,
        links_discovered: 4,
        links_excluded: 1,
        errors: 1,
        duration_ms: 120,
    }
}

fn record(full_url: &str, path: &str, state: VisitStatus) -> PageRecord {
    PageRecord {
        full_url: full_url.to_string(),
        path: path.to_string(),
        meta: PageMeta::default(),
        parent_url: None,
        status_code: None,
        status: None,
        content_type: None,
        error: None,
        depth: 0,
        state,
    }
}

fn visited_record(full_url: &str, path: &str, code: u16, title: &str) -> PageRecord {
    let mut rec = record(full_url, path, VisitStatus::Visited);
    rec.status_code = Some(code);
    rec.status = Some("OK".to_string());
    rec.content_type = Some("text/html".to_string());
    rec.meta.title = title.to_string();
    rec
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_contains_header_and_footer() {
    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("GRIDMAP SITE MAP REPORT"));
    assert!(text.contains("Generated:"));
    assert!(text.contains("End of Report"));
    assert!(text.contains("For authorized security testing only."));
}

#[test]
fn test_text_report_contains_summary_counts() {
    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("Targets:          1"));
    assert!(text.contains("Pages visited:    2"));
    assert!(text.contains("Links discovered: 4"));
    assert!(text.contains("Links excluded:   1"));
    assert!(text.contains("Errors:           1"));
}

#[test]
fn test_text_report_lists_paths_with_status() {
    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![
            visited_record("http://example.com/", "/", 200, "Home"),
            visited_record("http://example.com/about", "/about", 200, "About"),
        ],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("## example.com"));
    assert!(text.contains("/about"));
    assert!(text.contains("200"));
    assert!(text.contains("Home"));
}

#[test]
fn test_text_report_marks_unvisited_and_excluded() {
    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![
            record(
                "http://example.com/deep",
                "/deep",
                VisitStatus::Unvisited,
            ),
            record(
                "http://example.com/private/x",
                "/private/x",
                VisitStatus::ShouldNotVisit,
            ),
        ],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("[unvisited]"));
    assert!(text.contains("[excluded]"));
}

#[test]
fn test_text_report_shows_failure_message() {
    let mut failed = record(
        "http://example.com/broken",
        "/broken",
        VisitStatus::VisitedWithError,
    );
    failed.error = Some(ErrorInfo::Failure {
        message: "connection refused".to_string(),
    });

    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![failed],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("connection refused"));
}

#[test]
fn test_text_report_shows_non_html_content_type() {
    let mut pdf = visited_record("http://example.com/file.pdf", "/file.pdf", 200, "");
    pdf.content_type = Some("application/pdf".to_string());

    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![pdf],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("application/pdf"));
}

#[test]
fn test_text_report_groups_external_hosts_separately() {
    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![
            visited_record("http://example.com/", "/", 200, "Home"),
            visited_record("http://other.example.net/page", "/page", 200, ""),
        ],
    };

    let text = generate_text_report(&[report]);
    assert!(text.contains("## example.com"));
    assert!(text.contains("## other.example.net"));

    // The seed's host leads
    let seed_pos = text.find("## example.com").unwrap();
    let other_pos = text.find("## other.example.net").unwrap();
    assert!(seed_pos < other_pos);
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![visited_record("http://example.com/", "/", 200, "Home")],
    };

    let json_str = generate_json_report(&[report]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json_str).unwrap();

    assert_eq!(value["report"]["metadata"]["generator"], "Gridmap");
    assert_eq!(value["report"]["metadata"]["format"], "json");
    assert!(value["report"]["metadata"]["generated_at"].is_string());
    assert_eq!(value["report"]["summary"]["targets"], 1);
    assert_eq!(value["report"]["summary"]["pages_visited"], 2);
}

#[test]
fn test_json_report_includes_records() {
    let mut about = visited_record("http://example.com/about", "/about", 200, "About");
    about.meta.links_text = Some("About us".to_string());
    about.meta.href = Some("/about".to_string());
    about.meta.original_urls = vec!["/about".to_string(), "/about?ref=nav".to_string()];

    let report = RunReport {
        summary: summary("http://example.com"),
        records: vec![about],
    };

    let json_str = generate_json_report(&[report]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json_str).unwrap();

    let rec = &value["report"]["runs"][0]["records"][0];
    assert_eq!(rec["fullUrl"], "http://example.com/about");
    assert_eq!(rec["path"], "/about");
    assert_eq!(rec["statusCode"], 200);
    assert_eq!(rec["state"], "visited");
    assert_eq!(rec["metaInfo"]["title"], "About");
    assert_eq!(rec["metaInfo"]["linksText"], "About us");
    assert_eq!(rec["metaInfo"]["href"], "/about");
    assert_eq!(
        rec["metaInfo"]["originalUrls"],
        serde_json::json!(["/about", "/about?ref=nav"])
    );
}

#[test]
fn test_json_report_multiple_runs() {
    let first = RunReport {
        summary: summary("http://one.example.com"),
        records: vec![],
    };
    let second = RunReport {
        summary: summary("http://two.example.com"),
        records: vec![],
    };

    let json_str = generate_json_report(&[first, second]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json_str).unwrap();

    assert_eq!(value["report"]["summary"]["targets"], 2);
    assert_eq!(value["report"]["summary"]["pages_visited"], 4);
    assert_eq!(
        value["report"]["runs"][1]["summary"]["seed"],
        "http://two.example.com"
    );
}

// ============================================================================
// Save Report Tests
// ============================================================================

#[test]
fn test_save_report_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    save_report("report body", &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "report body");
}

#[test]
fn test_save_report_overwrites_existing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    save_report("first", &path).unwrap();
    save_report("second", &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "second");
}

#[test]
fn test_save_report_invalid_path() {
    let result = save_report("body", std::path::Path::new("/nonexistent/dir/report.txt"));
    assert!(result.is_err());
}
