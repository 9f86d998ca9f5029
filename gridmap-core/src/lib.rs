pub mod report;
pub mod run;

pub use report::{ReportFormat, RunReport, generate_json_report, generate_text_report, save_report};
pub use run::{RunProgressCallback, TraverseOptions, TraverseSummary, execute_traverse, extract_url_path};

use colored::Colorize;

/// Print the Gridmap startup banner.
pub fn print_banner() {
    let banner = r#"
 ██████╗ ██████╗ ██╗██████╗ ███╗   ███╗ █████╗ ██████╗
██╔════╝ ██╔══██╗██║██╔══██╗████╗ ████║██╔══██╗██╔══██╗
██║  ███╗██████╔╝██║██║  ██║██╔████╔██║███████║██████╔╝
██║   ██║██╔══██╗██║██║  ██║██║╚██╔╝██║██╔══██║██╔═══╝
╚██████╔╝██║  ██║██║██████╔╝██║ ╚═╝ ██║██║  ██║██║
 ╚═════╝ ╚═╝  ╚═╝╚═╝╚═════╝ ╚═╝     ╚═╝╚═╝  ╚═╝╚═╝
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}",
        "Breadth-first site mapper".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).cyan()
    );
    println!(
        "  {}\n",
        "For authorized security testing only.".bright_black()
    );
}
