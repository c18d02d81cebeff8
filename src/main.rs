//! rustaltmetric - Altmetric Explorer publication report
//!
//! Walks a signed Explorer listing URL, writes the CSV export and the
//! HTML digest body next to it.
//!
//! ## Usage
//!
//! ```bash
//! rustaltmetric report --url "https://www.altmetric.com/explorer/api/research_outputs?..." \
//!     --contact reports@example.edu --output ./output
//! rustaltmetric details 83360707
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use rustaltmetric::{
    config::ReportConfig,
    details::DetailsClient,
    digest::{self, DigestOptions},
    export,
    ingest::{IngestOptions, PageIngestor},
    projector::{self, ProjectionWindows},
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Altmetric Explorer publication report
#[derive(Parser)]
#[command(name = "rustaltmetric")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the CSV export and digest from a signed listing URL
    Report {
        /// Signed Explorer listing URL (digest and key already applied)
        #[arg(long)]
        url: String,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Days of publications in the CSV export
        #[arg(long, default_value = "365")]
        timeframe_days: i64,

        /// Days of publications in the digest
        #[arg(long, default_value = "60")]
        digest_days: i64,

        /// Entries listed in the digest before the overflow line
        #[arg(long, default_value = "10")]
        max_shown: usize,

        /// Contact address for the digest's unsubscribe line
        #[arg(long)]
        contact: String,

        /// Unit named in the digest heading
        #[arg(long, default_value = "IBS")]
        label: String,

        /// Extra department names to drop (repeatable)
        #[arg(long = "exclude-department")]
        exclude_departments: Vec<String>,

        /// Extra affiliation names to drop (repeatable)
        #[arg(long = "exclude-affiliation")]
        exclude_affiliations: Vec<String>,
    },

    /// Look up a single output on the public API
    Details {
        /// Altmetric ID
        id: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.json_logs {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .init();
    }

    match cli.command {
        Commands::Report {
            url,
            output,
            timeframe_days,
            digest_days,
            max_shown,
            contact,
            label,
            exclude_departments,
            exclude_affiliations,
        } => {
            let mut config = ReportConfig {
                timeframe_days,
                digest_timeframe_days: digest_days,
                max_shown,
                contact_address: contact,
                digest_label: label,
                ..Default::default()
            };
            config.department_exclusions.extend(exclude_departments);
            config.affiliation_exclusions.extend(exclude_affiliations);
            run_report(&url, &output, &config).await
        }
        Commands::Details { id } => run_details(&id).await,
    }
}

// ============================================================================
// Report Pipeline
// ============================================================================

async fn run_report(listing_url: &str, output_dir: &std::path::Path, config: &ReportConfig) -> Result<()> {
    config.validate().context("Invalid report settings")?;
    url::Url::parse(listing_url).context("Invalid --url")?;

    let today = Local::now().date_naive();
    std::fs::create_dir_all(output_dir).context("Failed to create output directory")?;

    println!("\n--- Stage 1: Listing Ingestion ---");
    let ingestor = PageIngestor::new(IngestOptions::from_config(config, today))?;
    let listing = ingestor
        .fetch(listing_url)
        .await
        .context("Failed to fetch listing")?;
    println!(
        "Fetched {} records over {} pages ({} entities).",
        listing.records.len(),
        listing.pages_fetched,
        listing.entities.len()
    );

    println!("\n--- Stage 2: Projection ---");
    let windows = ProjectionWindows {
        table_days: config.timeframe_days,
        digest_days: config.digest_timeframe_days,
    };
    let projection = projector::project(&listing.records, &listing.entities, windows, today)
        .context("Failed to project records")?;
    println!(
        "{} rows in the last {} days, {} in the last {} days.",
        projection.table.len(),
        config.timeframe_days,
        projection.digest.len(),
        config.digest_timeframe_days
    );

    println!("\n--- Stage 3: Output ---");
    let csv_path = output_dir.join(export::export_file_name(today));
    export::save_csv(&projection.table, &csv_path).context("Failed to write CSV")?;
    println!("Saved: {:?}", csv_path);

    let body = digest::compose(&projection.digest, &DigestOptions::from_config(config), today);
    let digest_path = output_dir.join("digest.html");
    std::fs::write(&digest_path, body).context("Failed to write digest")?;
    println!("Saved: {:?}", digest_path);

    info!(output = %output_dir.display(), "Report complete");
    println!("\n✓ Report complete. Results in: {}", output_dir.display());
    Ok(())
}

async fn run_details(id: &str) -> Result<()> {
    let client = DetailsClient::new()?;
    match client.article_details(id).await? {
        Some(details) => println!("{}", serde_json::to_string_pretty(&details)?),
        None => println!("No details found for {}", id),
    }
    Ok(())
}
