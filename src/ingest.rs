//! Altmetric Explorer listing client.
//!
//! Walks the paginated `research_outputs` listing, accumulating raw records and
//! resolving each page's `included` entities into an [`EntityMap`].
//!
//! Pagination rules:
//! - A fixed courtesy sleep precedes every request
//! - Pages are assumed to be ordered newest-first, so once the last record on a
//!   page falls outside the window no later page can contain anything newer
//! - No retries; transport and parse failures propagate to the caller

use crate::config::ReportConfig;
use crate::dates::{age_in_days, parse_publication_date};
use crate::entities::{deserialize_id, EntityMap, Exclusions, IncludedEntity};
use crate::error::{AltmetricError, OptionExt, Result};
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reference from a record to an entity in `included`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<EntityRef>),
    One(EntityRef),
    Null(()),
    /// Relationship shapes that carry no entity references (e.g. `meta` blocks)
    Other(IgnoredAny),
}

/// The service sends `journal` as a single object and the rest as arrays
fn deserialize_relationships<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, Vec<EntityRef>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, OneOrMany> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(kind, refs)| {
            let refs = match refs {
                OneOrMany::Many(refs) => refs,
                OneOrMany::One(one) => vec![one],
                OneOrMany::Null(()) | OneOrMany::Other(_) => Vec::new(),
            };
            (kind, refs)
        })
        .collect())
}

/// One research output as returned by the listing
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, deserialize_with = "deserialize_relationships")]
    pub relationships: HashMap<String, Vec<EntityRef>>,
}

impl RawRecord {
    /// Parsed `publication-date`, `None` when absent, non-string or malformed
    pub fn publication_date(&self) -> Option<NaiveDate> {
        self.attributes
            .get("publication-date")
            .and_then(Value::as_str)
            .and_then(parse_publication_date)
    }

    /// Nested attribute object such as `identifiers` or `mentions`
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.attributes.get(name).and_then(Value::as_object)
    }

    /// References for a relationship kind, empty when the record has none
    pub fn references(&self, kind: &str) -> &[EntityRef] {
        self.relationships
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ListingPage {
    #[serde(default)]
    meta: Option<PageMeta>,
    #[serde(default)]
    data: Vec<RawRecord>,
    #[serde(default)]
    included: Vec<IncludedEntity>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    response: ResponseMeta,
}

#[derive(Debug, Deserialize)]
struct ResponseMeta {
    #[serde(rename = "total-pages")]
    total_pages: usize,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    #[serde(rename = "self")]
    self_link: Option<String>,
    last: Option<String>,
    next: Option<String>,
}

impl PageLinks {
    fn is_last_page(&self) -> bool {
        self.self_link.is_some() && self.self_link == self.last
    }
}

/// Options controlling a single ingestion run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Window used for the early-exit check
    pub timeframe_days: i64,
    pub exclusions: Exclusions,
    pub page_delay: Duration,
    /// Reference date for record ages
    pub today: NaiveDate,
}

impl IngestOptions {
    pub fn from_config(config: &ReportConfig, today: NaiveDate) -> Self {
        Self {
            timeframe_days: config.timeframe_days,
            exclusions: Exclusions::new(
                config.department_exclusions.iter().cloned(),
                config.affiliation_exclusions.iter().cloned(),
            ),
            page_delay: config.page_delay,
            today,
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default(), Local::now().date_naive())
    }
}

/// Accumulated output of a pagination run
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    pub records: Vec<RawRecord>,
    pub entities: EntityMap,
    pub pages_fetched: usize,
}

/// Sequential paginating client for the listing endpoint
pub struct PageIngestor {
    client: Client,
    options: IngestOptions,
}

impl PageIngestor {
    /// Create an ingestor with its own HTTP client
    pub fn new(options: IngestOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rustaltmetric/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AltmetricError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, options))
    }

    pub fn with_client(client: Client, options: IngestOptions) -> Self {
        Self { client, options }
    }

    /// Walk the listing starting at a signed `listing_url`.
    ///
    /// A record without a usable publication date never triggers the early
    /// exit on its own; pagination continues past it.
    pub async fn fetch(&self, listing_url: &str) -> Result<IngestResult> {
        let mut page = self.fetch_page(listing_url).await?;
        let total_pages = page
            .meta
            .as_ref()
            .map(|meta| meta.response.total_pages)
            .ok_or_parse("Listing response has no meta.response.total-pages")?;

        let mut result = IngestResult::default();

        for page_number in 1..=total_pages {
            info!(page = page_number, total = total_pages, "Loading page");
            result.pages_fetched = page_number;

            let outside_window = page
                .data
                .last()
                .and_then(RawRecord::publication_date)
                .map(|date| age_in_days(self.options.today, date) >= self.options.timeframe_days)
                .unwrap_or(false);

            result.records.append(&mut page.data);
            let added = result.entities.absorb(&page.included, &self.options.exclusions);
            debug!(page = page_number, added = added, "Resolved included entities");

            if page.links.is_last_page() {
                debug!(page = page_number, "Reached last page");
                break;
            }
            if outside_window {
                info!(
                    page = page_number,
                    timeframe_days = self.options.timeframe_days,
                    "Oldest record on page is outside the window, stopping"
                );
                break;
            }
            if page_number == total_pages {
                break;
            }
            let Some(next) = page.links.next.take() else {
                warn!(page = page_number, "Page has no next link, stopping");
                break;
            };
            page = self.fetch_page(&next).await?;
        }

        info!(
            pages = result.pages_fetched,
            records = result.records.len(),
            entities = result.entities.len(),
            "Listing ingestion complete"
        );
        Ok(result)
    }

    async fn fetch_page(&self, url: &str) -> Result<ListingPage> {
        tokio::time::sleep(self.options.page_delay).await;
        debug!(url = %url, "Fetching listing page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AltmetricError::Api {
                code: status.as_u16(),
                message: format!("Altmetric listing error: {}", status),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| AltmetricError::Parse(format!("Failed to parse listing page: {}", e)))
    }
}
