use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("gridmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("gridmap")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("map")
                .about(
                    "Map a host or collection of hosts breadth-first, recording every link \
                discovered along the way.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to map. Bare domains are assumed to be https://")
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to map")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("How many levels of links to follow from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(-x --"exclude" <SUBSTRING>)
                        .required(false)
                        .help("Skip links whose URL contains this substring (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-b --"backend" <BACKEND>)
                        .required(false)
                        .help("Fetch backend: plain HTTP or a WebDriver-driven browser")
                        .value_parser(["http", "webdriver"])
                        .default_value("http"),
                )
                .arg(
                    arg!(--"webdriver-url" <URL>)
                        .required(false)
                        .help("WebDriver endpoint to connect to when --backend webdriver")
                        .default_value("http://localhost:9515"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"user-agent" <STRING>)
                        .required(false)
                        .help("Override the User-Agent header"),
                )
                .arg(
                    arg!(--"include-all")
                        .required(false)
                        .help("Report every recorded link, including excluded ones")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("only-visited"),
                )
                .arg(
                    arg!(--"only-visited")
                        .required(false)
                        .help("Report only links that were actually visited")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("include-all"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}
