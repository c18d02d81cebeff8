//! # rustaltmetric
//!
//! Altmetric Explorer publication report pipeline.
//!
//! ## Modules
//!
//! - [`ingest`] - Paginated listing client, raw records
//! - [`entities`] - First-wins resolution of included entities
//! - [`projector`] - Table and digest projection with date windows
//! - [`digest`] - HTML email digest
//! - [`export`] - CSV output
//! - [`badge`] - Badge URL to details page URL
//! - [`details`] - Public API lookup by Altmetric ID
//! - [`config`] - Report settings
//! - [`dates`] - Publication date parsing and ages
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustaltmetric::{config::ReportConfig, digest, ingest, projector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReportConfig::default();
//!     let today = chrono::Local::now().date_naive();
//!     let ingestor = ingest::PageIngestor::new(ingest::IngestOptions::from_config(&config, today))?;
//!     let listing = ingestor.fetch("https://www.altmetric.com/explorer/api/research_outputs?...").await?;
//!     let windows = projector::ProjectionWindows {
//!         table_days: config.timeframe_days,
//!         digest_days: config.digest_timeframe_days,
//!     };
//!     let projection = projector::project(&listing.records, &listing.entities, windows, today)?;
//!     let body = digest::compose(&projection.digest, &digest::DigestOptions::from_config(&config), today);
//!     println!("{} rows, digest of {} bytes", projection.table.len(), body.len());
//!     Ok(())
//! }
//! ```

pub mod badge;
pub mod config;
pub mod dates;
pub mod details;
pub mod digest;
pub mod entities;
pub mod error;
pub mod export;
pub mod ingest;
pub mod projector;

pub use error::{AltmetricError, Result};
