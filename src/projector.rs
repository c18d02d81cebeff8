//! Projection of raw listing records into the CSV table and the email digest.
//!
//! Each record is date-gated against two windows. Records inside the table
//! window become a [`TableRow`]; those also inside the digest window become a
//! [`DigestEntry`]. Both outputs are ordered newest first.

use crate::badge::badge_to_details_url;
use crate::dates::age_in_days;
use crate::entities::{EntityMap, EntityRecord};
use crate::error::{AltmetricError, Result};
use crate::ingest::RawRecord;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Column titles of the CSV export, in order
pub const TABLE_COLUMNS: [&str; 16] = [
    "Altmetric Attention Score",
    "Publication Date",
    "Authors at my Institution",
    "Title",
    "DOI",
    "Journal/Collection Title",
    "Journal ISSNs",
    "PubMed ID",
    "PubMedCentral ID",
    "Departments",
    "Output Type",
    "Subjects (FoR)",
    "Affiliations (GRID)",
    "Funder",
    "ISBN",
    "Details Page URL",
];

/// Prefix making DOIs clickable
pub const DOI_URL_PREFIX: &str = "https://doi.org/";

/// Relationship keys on research outputs
pub mod relationships {
    pub const AUTHORS: &str = "institutional-authors";
    pub const DEPARTMENTS: &str = "institutional-departments";
    pub const JOURNAL: &str = "journal";
    pub const SUBJECTS: &str = "fields-of-research";
    pub const AFFILIATIONS: &str = "affiliations";
    pub const FUNDERS: &str = "funders";
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pull a field out of an attribute object as display text.
///
/// Lists are joined with `", "`, scalars are used as-is and missing keys
/// become the empty string.
pub fn extract_attribute(attributes: &Map<String, Value>, key: &str) -> String {
    match attributes.get(key) {
        Some(Value::Array(items)) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        Some(value) => render_value(value),
        None => String::new(),
    }
}

/// Capitalise the first letter of every word and lower-case the rest.
///
/// A word starts after any non-letter, so `"O'NEIL, MARY-JO"` becomes
/// `"O'Neil, Mary-Jo"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// One line of the CSV export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub score: String,
    pub publication_date: NaiveDate,
    pub authors: String,
    pub title: String,
    pub doi_url: String,
    pub journal_title: String,
    pub journal_issns: String,
    pub pubmed_id: String,
    pub pmc_id: String,
    pub departments: String,
    pub output_type: String,
    pub subjects: String,
    pub affiliations: String,
    pub funders: String,
    pub isbn: String,
    pub details_url: String,
}

impl TableRow {
    /// Fields in [`TABLE_COLUMNS`] order
    pub fn to_record(&self) -> [String; 16] {
        [
            self.score.clone(),
            self.publication_date.format("%Y-%m-%d").to_string(),
            self.authors.clone(),
            self.title.clone(),
            self.doi_url.clone(),
            self.journal_title.clone(),
            self.journal_issns.clone(),
            self.pubmed_id.clone(),
            self.pmc_id.clone(),
            self.departments.clone(),
            self.output_type.clone(),
            self.subjects.clone(),
            self.affiliations.clone(),
            self.funders.clone(),
            self.isbn.clone(),
            self.details_url.clone(),
        ]
    }
}

/// One publication in the email digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub authors: String,
    pub journal: String,
    pub publication_date: NaiveDate,
    pub title: String,
    pub details_url: String,
}

impl From<&TableRow> for DigestEntry {
    fn from(row: &TableRow) -> Self {
        Self {
            authors: row.authors.clone(),
            journal: row.journal_title.clone(),
            publication_date: row.publication_date,
            title: row.title.clone(),
            details_url: row.details_url.clone(),
        }
    }
}

/// Sorted table rows; the header is implied by [`TABLE_COLUMNS`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<TableRow>,
}

impl Table {
    pub fn header(&self) -> &'static [&'static str; 16] {
        &TABLE_COLUMNS
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Header followed by every row, ready for a CSV writer
    pub fn records(&self) -> Vec<Vec<String>> {
        std::iter::once(TABLE_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<String>>())
            .chain(self.rows.iter().map(|row| row.to_record().to_vec()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Recency thresholds in days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionWindows {
    pub table_days: i64,
    pub digest_days: i64,
}

impl Default for ProjectionWindows {
    fn default() -> Self {
        Self {
            table_days: 365,
            digest_days: 60,
        }
    }
}

/// Both outputs of a projection run
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub table: Table,
    pub digest: Vec<DigestEntry>,
}

fn resolved_names<'a>(record: &RawRecord, kind: &str, entities: &'a EntityMap) -> Vec<&'a str> {
    record
        .references(kind)
        .iter()
        .filter_map(|r| entities.lookup(&r.id))
        .map(EntityRecord::name)
        .collect()
}

fn journal_fields(record: &RawRecord, entities: &EntityMap) -> (String, String) {
    let resolved = record
        .references(relationships::JOURNAL)
        .first()
        .and_then(|r| entities.lookup(&r.id));

    match resolved {
        Some(EntityRecord::Journal { title, issns }) => (title.clone(), issns.join(", ")),
        Some(other) => (other.name().to_string(), String::new()),
        None => (String::new(), String::new()),
    }
}

fn build_row(
    record: &RawRecord,
    publication_date: NaiveDate,
    entities: &EntityMap,
) -> Result<TableRow> {
    let empty = Map::new();
    let identifiers = record.section("identifiers").unwrap_or(&empty);

    let badge_url = extract_attribute(&record.attributes, "badge-url");
    let details_url =
        badge_to_details_url(&badge_url).ok_or_else(|| AltmetricError::BadgeUrl {
            record_id: record.id.clone(),
            url: badge_url.clone(),
        })?;

    let authors = resolved_names(record, relationships::AUTHORS, entities)
        .into_iter()
        .map(title_case)
        .collect::<Vec<_>>()
        .join("; ");
    let (journal_title, journal_issns) = journal_fields(record, entities);

    Ok(TableRow {
        score: extract_attribute(&record.attributes, "altmetric-score"),
        publication_date,
        authors,
        title: extract_attribute(&record.attributes, "title"),
        doi_url: format!("{}{}", DOI_URL_PREFIX, extract_attribute(identifiers, "dois")),
        journal_title,
        journal_issns,
        pubmed_id: extract_attribute(identifiers, "pubmed-ids"),
        pmc_id: extract_attribute(identifiers, "pmc-ids"),
        departments: resolved_names(record, relationships::DEPARTMENTS, entities).join("; "),
        output_type: extract_attribute(&record.attributes, "output-type"),
        subjects: resolved_names(record, relationships::SUBJECTS, entities).join("; "),
        affiliations: resolved_names(record, relationships::AFFILIATIONS, entities).join("; "),
        funders: resolved_names(record, relationships::FUNDERS, entities).join("; "),
        isbn: extract_attribute(identifiers, "isbns"),
        details_url,
    })
}

/// Project raw records into the sorted table and the digest.
///
/// A record enters the digest only if it also entered the table, so the
/// digest is a subset of the table for any pair of windows. Records without a
/// parseable publication date are left out of both.
///
/// Fails with [`AltmetricError::BadgeUrl`] if an included record's badge URL
/// is not a donut image URL.
pub fn project(
    records: &[RawRecord],
    entities: &EntityMap,
    windows: ProjectionWindows,
    today: NaiveDate,
) -> Result<Projection> {
    let mut rows = Vec::new();
    let mut digest = Vec::new();

    for record in records {
        let Some(publication_date) = record.publication_date() else {
            warn!(id = %record.id, "Record has no usable publication date, excluding");
            continue;
        };

        let age = age_in_days(today, publication_date);
        if age >= windows.table_days {
            debug!(id = %record.id, age = age, "Record outside table window");
            continue;
        }

        let row = build_row(record, publication_date, entities)?;
        if age < windows.digest_days {
            digest.push(DigestEntry::from(&row));
        }
        rows.push(row);
    }

    rows.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
    digest.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));

    info!(
        records = records.len(),
        table_rows = rows.len(),
        digest_entries = digest.len(),
        "Projection complete"
    );

    Ok(Projection {
        table: Table { rows },
        digest,
    })
}
