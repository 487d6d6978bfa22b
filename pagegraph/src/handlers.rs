use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use pagegraph_core::crawl::{CrawlOptions, execute_crawl, generate_crawl_summary};
use pagegraph_core::render::{GraphFormat, write_graph_to};
use pagegraph_scanner::Edge;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

/// Output settings taken from the command line
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub path: PathBuf,
    pub format: GraphFormat,
    pub quiet: bool,
}

/// Build crawl options from parsed arguments
pub fn crawl_options_from_matches(matches: &ArgMatches) -> Result<CrawlOptions> {
    let url = matches
        .get_one::<Url>("url")
        .ok_or_else(|| anyhow!("missing start URL"))?;
    let mut options = CrawlOptions::new(url.as_str());

    if let Some(depth) = matches.get_one::<i32>("depth") {
        options.max_depth = *depth;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        options.threads = *threads;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    if matches.get_flag("no-scope") {
        options.scope_prefix = None;
    }
    options.show_progress_bars = !matches.get_flag("quiet");

    Ok(options)
}

pub fn output_options_from_matches(matches: &ArgMatches) -> Result<OutputOptions> {
    let path = matches
        .get_one::<PathBuf>("out")
        .cloned()
        .ok_or_else(|| anyhow!("output file name required"))?;
    let format = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<GraphFormat>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default();

    Ok(OutputOptions {
        path,
        format,
        quiet: matches.get_flag("quiet"),
    })
}

/// Cancels `cancel` on the first SIGINT or SIGTERM.
pub fn spawn_signal_listener(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = shutdown_signal() => {}
        }
        warn!("Shutdown signal received, finishing with a partial graph");
        cancel.cancel();
    })
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut terminate) = signal(SignalKind::terminate()) else {
        let _ = tokio::signal::ctrl_c().await;
        return;
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Create the output file up front so a bad path fails before any fetch
pub fn create_output(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create output file {}", path.display()))
}

/// Write the graph, attaching the path to any I/O error
pub fn write_output(file: &mut File, path: &Path, edges: &[Edge], format: GraphFormat) -> Result<()> {
    write_graph_to(file, edges, format)
        .with_context(|| format!("Failed to write graph to {}", path.display()))
}

pub async fn handle_crawl(matches: &ArgMatches) -> Result<()> {
    let output = output_options_from_matches(matches)?;
    let options = crawl_options_from_matches(matches)?;
    let mut file = create_output(&output.path)?;

    if !output.quiet {
        println!("\n{} {}", "Crawling".cyan().bold(), options.start_url);
        println!("Workers: {}", options.threads);
        println!("Max depth: {}", options.max_depth);
        match options.scope_prefix {
            Some(ref prefix) => println!("Scope: {}\n", prefix),
            None => println!("Scope: unrestricted\n"),
        }
    }

    let cancel = CancellationToken::new();
    let signals = spawn_signal_listener(cancel.clone());

    let outcome = execute_crawl(options, cancel.clone(), None)
        .await
        .map_err(|e| anyhow!(e))?;

    // stop listening once the crawl is over
    cancel.cancel();
    let _ = signals.await;

    write_output(&mut file, &output.path, &outcome.edges, output.format)?;
    info!("Wrote {} edges to {}", outcome.edges.len(), output.path.display());

    if !output.quiet {
        print!("{}", generate_crawl_summary(&outcome));
        println!(
            "{} Graph written to {}",
            "✓".green().bold(),
            output.path.display()
        );
    }

    Ok(())
}
