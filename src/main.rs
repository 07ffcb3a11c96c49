//! Trawler main entry point
//!
//! This is the terminal console for the Trawler crawler: it supplies the start
//! parameters, forwards pause/stop commands and prints the log stream.

use anyhow::Context;
use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use trawler::config::{load_config_with_hash, validate, Config};
use trawler::output::{export_log, generate_markdown_summary, print_report};
use trawler::{ConsoleEvent, CrawlController, CrawlReport, StartRequest};

/// Trawler: a polite single-host file crawler
///
/// Trawler walks a website breadth-first from a seed URL, stays on the seed's
/// host, and saves every linked document, image, archive or media file into a
/// local folder. Type `p` + Enter to pause or resume, `s` + Enter to stop.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version)]
#[command(about = "A polite single-host file crawler", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Maximum link depth from the seed (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of pages to visit (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Existing directory downloads are saved into
    #[arg(long, value_name = "DIR")]
    save_folder: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the console log to this file when the crawl ends
    #[arg(long, value_name = "FILE")]
    export_log: Option<PathBuf>,

    /// Write a markdown summary to this file when the crawl ends
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let request = StartRequest {
        seed_url: cli.seed.clone(),
        max_depth: config.crawler.max_depth,
        max_pages: config.crawler.max_pages,
        save_folder: config.download.save_folder.clone(),
    };

    let (controller, mut events) = CrawlController::new(config);
    controller.start(request).context("Could not start crawl")?;

    let commands = tokio::spawn(read_commands(controller.clone(), spawn_stdin_reader()));
    let interrupt = tokio::spawn(stop_on_ctrl_c(controller.clone()));

    let mut log_lines = Vec::new();
    let mut report = None;
    while let Some(event) = events.recv().await {
        match event {
            ConsoleEvent::Log(line) => {
                println!("{}", line);
                log_lines.push(line);
            }
            ConsoleEvent::Busy(busy) => {
                tracing::debug!("Busy: {}", busy);
            }
            ConsoleEvent::Finished(finished) => {
                report = Some(finished);
                break;
            }
        }
    }

    commands.abort();
    interrupt.abort();

    let report = match report {
        Some(report) => report,
        None => controller
            .wait()
            .await
            .context("Crawl ended without a report")?,
    };

    println!();
    print_report(&report);

    if let Some(path) = &cli.export_log {
        export_log(&log_lines, path)
            .with_context(|| format!("Failed to export log to {}", path.display()))?;
        println!("\n✓ Log exported to: {}", path.display());
    }

    if let Some(path) = &cli.summary {
        write_summary(&report, path)?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(save_folder) = &cli.save_folder {
        config.download.save_folder = save_folder.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Forwards stdin lines from a detached thread
///
/// A blocking stdin read cannot be cancelled, so it must not hold up the
/// runtime shutdown once the report is printed.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        }
    });
    rx
}

/// Applies `p` (toggle pause) and `s` (stop) commands
async fn read_commands(controller: CrawlController, mut lines: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        let result = match line.trim() {
            "p" | "pause" | "resume" => controller.toggle_pause().map(|_| ()),
            "s" | "stop" => controller.stop(),
            "" => continue,
            other => {
                eprintln!("Unknown command '{}': use 'p' to pause/resume, 's' to stop", other);
                continue;
            }
        };

        if let Err(e) = result {
            tracing::warn!("{}", e);
        }
    }
}

/// Requests a stop on every Ctrl-C
async fn stop_on_ctrl_c(controller: CrawlController) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if let Err(e) = controller.stop() {
            tracing::warn!("{}", e);
        }
    }
}

fn write_summary(report: &CrawlReport, path: &Path) -> anyhow::Result<()> {
    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(report, path)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    println!("✓ Summary exported to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_commands_end_when_input_closes() {
        let (controller, _events) = CrawlController::new(Config::default());
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("p".to_string()).unwrap();
        tx.send("bogus".to_string()).unwrap();
        tx.send("s".to_string()).unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), read_commands(controller.clone(), rx))
            .await
            .expect("Command reader did not finish");
        assert_eq!(controller.phase(), trawler::CrawlPhase::Idle);
    }
}
