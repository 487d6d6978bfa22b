use clap::{arg, value_parser};
use pagegraph_core::wiki::DEFAULT_START_URL;
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("pagegraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pagegraph")
        .about("Crawls a wiki from one page and writes the link graph between page titles")
        .styles(CLAP_STYLING)
        .after_help("Long flags take two dashes: write `--out g.dot --depth 2`, or `-o g.dot -d 2`.")
        .arg(
            arg!(-o --"out" <PATH>)
                .required(true)
                .help("File the graph is written to")
                .value_parser(value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-d --"depth" <DEPTH>)
                .required(false)
                .help("How many link hops to follow from the start page")
                .value_parser(value_parser!(i32).range(0..))
                .default_value("1"),
        )
        .arg(
            arg!(-u --"url" <URL>)
                .required(false)
                .help("The page to start crawling from")
                .value_parser(value_parser!(Url))
                .default_value(DEFAULT_START_URL),
        )
        .arg(
            arg!(-t --"threads" <NUM_WORKERS>)
                .required(false)
                .help("The number of fetch workers (default: available parallelism)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Graph format: dot, json")
                .value_parser(["dot", "json"])
                .default_value("dot"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"no-scope")
                .required(false)
                .help("Follow links outside the start page's /wiki/ prefix")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-q --"quiet")
                .required(false)
                .help("Suppress the progress spinner and summary")
                .action(clap::ArgAction::SetTrue),
        )
}
