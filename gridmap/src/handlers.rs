use clap::ArgMatches;
use colored::Colorize;
use gridmap_core::report::{
    ReportFormat, RunReport, generate_json_report, generate_text_report, save_report,
};
use gridmap_crawler::{FetchBackend, FetchConfig, RecordFilter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber;
use url::Url;

// Helper functions for the map handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&String>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        parse_url_line(url.trim())
            .map(|u| vec![u])
            .ok_or_else(|| format!("Invalid URL '{}'", url))
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    // Try to parse as-is
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    // Try adding https://
    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

// Re-export run types and functions from gridmap-core
pub use gridmap_core::run::{
    RunProgressCallback, TraverseOptions, TraverseSummary, execute_traverse, extract_url_path,
};

pub async fn handle_map(sub_matches: &ArgMatches, quiet: bool) {
    // Initialize tracing for logging. Logs go to stderr so a JSON
    // report on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let url = sub_matches.get_one::<String>("url");
    let hosts_file = sub_matches.get_one::<std::path::PathBuf>("hosts-file");
    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&3);
    let excludes: Vec<String> = sub_matches
        .get_many::<String>("exclude")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let backend_name = sub_matches
        .get_one::<String>("backend")
        .map(String::as_str)
        .unwrap_or("http");
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let user_agent = sub_matches.get_one::<String>("user-agent");
    let include_all = sub_matches.get_flag("include-all");
    let only_visited = sub_matches.get_flag("only-visited");
    let format = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let output = sub_matches.get_one::<std::path::PathBuf>("output");

    // Load URLs from source
    let urls = match load_urls_from_source(url, hosts_file) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let record_filter = if include_all {
        RecordFilter::All
    } else if only_visited {
        RecordFilter::VisitedOnly
    } else {
        RecordFilter::Visitable
    };

    let backend = match backend_name {
        "webdriver" => FetchBackend::WebDriver {
            endpoint: sub_matches
                .get_one::<String>("webdriver-url")
                .cloned()
                .unwrap_or_else(|| "http://localhost:9515".to_string()),
        },
        _ => FetchBackend::Http,
    };

    let mut fetch = FetchConfig {
        backend,
        timeout_secs: timeout,
        ..FetchConfig::default()
    };
    if let Some(agent) = user_agent {
        fetch.user_agent = agent.clone();
    }

    // Print run configuration
    if !quiet {
        let backend_str = match fetch.backend {
            FetchBackend::Http => "http".to_string(),
            FetchBackend::WebDriver { ref endpoint } => format!("webdriver ({})", endpoint),
        };
        println!("\n🕸️  Mapping {} host(s)", urls.len());
        println!("Max depth: {}", max_depth);
        println!("Backend: {}", backend_str);
        if !excludes.is_empty() {
            println!("Excluding: {}", excludes.join(", "));
        }
        println!();
    }

    // Map each seed in turn; one failed seed does not stop the rest
    let mut reports: Vec<RunReport> = Vec::new();
    let mut failures = 0usize;

    for (idx, seed) in urls.iter().enumerate() {
        if !quiet && urls.len() > 1 {
            println!("Mapping host {}/{}: {}", idx + 1, urls.len(), seed);
        }

        let options = TraverseOptions {
            url: seed.clone(),
            max_depth,
            excludes: excludes.clone(),
            record_filter,
            fetch: fetch.clone(),
            show_progress_bar: !quiet,
        };

        match execute_traverse(options, None).await {
            Ok((summary, records)) => {
                reports.push(RunReport { summary, records });
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                failures += 1;
            }
        }
    }

    if reports.is_empty() {
        eprintln!(
            "{} All {} target(s) failed",
            "✗".red().bold(),
            failures
        );
        std::process::exit(1);
    }

    if !quiet {
        println!("\n{} Mapping complete!\n", "✓".green().bold());
    }

    // Generate the report in the requested format
    let report_content = match ReportFormat::from_str(format) {
        Some(ReportFormat::Json) => match generate_json_report(&reports) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("{} Failed to serialize report: {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        _ => generate_text_report(&reports),
    };

    match output {
        Some(path) => {
            let path_str = path.display().to_string();
            let expanded = shellexpand::tilde(&path_str);
            let target = Path::new(expanded.as_ref());
            match save_report(&report_content, target) {
                Ok(()) => {
                    println!(
                        "{} Report saved to {}",
                        "✓".green().bold(),
                        target.display()
                    );
                }
                Err(e) => {
                    eprintln!("{} Failed to save report: {}", "✗".red().bold(), e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            print!("{}", report_content);
        }
    }

    if failures > 0 {
        eprintln!("\n⚠️  {} target(s) failed", failures);
    }
}
