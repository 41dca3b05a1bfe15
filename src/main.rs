//! Link-Auditor main entry point
//!
//! This is the command-line interface for the Link-Auditor backlink checker.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use link_auditor::audit::audit_config;
use link_auditor::config::{load_config_with_hash, Config};
use link_auditor::output::{
    generate_markdown_summary, print_statistics, write_results, AuditSummary, BatchStatistics,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Auditor: a backlink and SEO signal checker
///
/// Link-Auditor resolves every configured page through its redirects,
/// then checks the page for the expected anchor/URL pairs, robots.txt
/// permissions, indexing directives and its canonical link.
#[derive(Parser, Debug)]
#[command(name = "link-auditor")]
#[command(version = "1.0.0")]
#[command(about = "A backlink and SEO signal checker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be audited without sending requests
    #[arg(long)]
    dry_run: bool,

    /// Override the JSON results path from the config
    #[arg(long, value_name = "PATH")]
    results: Option<PathBuf>,

    /// Override the markdown summary path from the config
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let results_path = cli
        .results
        .unwrap_or_else(|| PathBuf::from(&config.output.results_path));
    let summary_path = cli
        .summary
        .unwrap_or_else(|| PathBuf::from(&config.output.summary_path));

    handle_audit(&config, config_hash, results_path, summary_path).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_auditor=info,warn"),
            1 => EnvFilter::new("link_auditor=debug,info"),
            2 => EnvFilter::new("link_auditor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the settings and the rows to audit
fn handle_dry_run(config: &Config) {
    println!("=== Link-Auditor Dry Run ===\n");

    println!("HTTP Configuration:");
    println!("  User-Agent: {}", config.http.user_agent);
    println!("  HEAD timeout: {}s", config.http.head_timeout_secs);
    println!("  GET timeout: {}s", config.http.get_timeout_secs);
    println!("  robots.txt timeout: {}s", config.http.robots_timeout_secs);
    println!("  Max redirects: {}", config.http.max_redirects);

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    println!("  Summary: {}", config.output.summary_path);

    let rows = config.audit_rows();
    println!("\nPages ({}):", rows.len());
    for row in &rows {
        let pairs = row.pairs();
        let expected = pairs.iter().filter(|pair| pair.is_checkable()).count();
        println!("  - {} ({} expected links)", row.url, expected);
        for pair in pairs.iter().filter(|pair| pair.is_checkable()) {
            println!(
                "    * '{}' -> {}",
                pair.anchor_text.as_deref().unwrap_or(""),
                pair.target_url.as_deref().unwrap_or("")
            );
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would audit {} pages", rows.len());
}

/// Handles the main audit operation
async fn handle_audit(
    config: &Config,
    config_hash: String,
    results_path: PathBuf,
    summary_path: PathBuf,
) -> Result<()> {
    let started_at = Utc::now();
    let results = audit_config(config).await.context("audit failed")?;
    let finished_at = Utc::now();

    let statistics = BatchStatistics::from_results(&results);
    println!();
    print_statistics(&statistics);

    write_results(&results, &results_path)
        .with_context(|| format!("failed to write results to {}", results_path.display()))?;

    let summary = AuditSummary {
        started_at,
        finished_at,
        config_hash,
        statistics,
    };
    generate_markdown_summary(&summary, &results, &summary_path)
        .with_context(|| format!("failed to write summary to {}", summary_path.display()))?;

    println!("\n✓ Results written to: {}", results_path.display());
    println!("✓ Summary written to: {}", summary_path.display());
    Ok(())
}
