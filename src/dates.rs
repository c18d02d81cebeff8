//! Publication date helpers shared by ingestion, projection and the digest.

use chrono::NaiveDate;

/// Format of `publication-date` attributes
pub const PUBLICATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `publication-date` value, `None` when malformed
pub fn parse_publication_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, PUBLICATION_DATE_FORMAT).ok()
}

/// Whole days between `date` and `today`; negative for future dates
pub fn age_in_days(today: NaiveDate, date: NaiveDate) -> i64 {
    (today - date).num_days()
}
