use colored::Colorize;
use pagegraph::commands::command_argument_builder;
use pagegraph::handle_crawl;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = handle_crawl(&matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
