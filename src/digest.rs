//! HTML email digest of recent publications.
//!
//! Fields are interpolated verbatim: titles or author names containing markup
//! characters (`<`, `&`, `"`) are not escaped and will alter the rendered
//! HTML. Downstream mail templates rely on this exact byte layout.

use crate::config::ReportConfig;
use crate::dates::age_in_days;
use crate::projector::DigestEntry;
use chrono::NaiveDate;

const ENTRY_SEPARATOR: &str = "<hr style=\"width:50%;text-align:left;margin-left:0\"><br>";

/// Rendering settings for [`compose`]
#[derive(Debug, Clone)]
pub struct DigestOptions {
    /// Digest window named in the heading
    pub window_days: i64,
    /// Address for the unsubscribe line
    pub contact_address: String,
    /// Entries rendered before the overflow summary
    pub max_shown: usize,
    /// Unit named in the heading, e.g. "IBS"
    pub label: String,
    pub attachment_note: String,
    pub signature: String,
}

/// Note pointing readers at the CSV attachment for a table window
pub fn attachment_note(table_days: i64) -> String {
    let period = if table_days == 365 {
        "12 months".to_string()
    } else {
        format!("{} days", table_days)
    };
    format!(
        "See Attached CSV for the last {} of publications by departmental authors.",
        period
    )
}

impl DigestOptions {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            window_days: config.digest_timeframe_days,
            contact_address: config.contact_address.clone(),
            max_shown: config.max_shown,
            label: config.digest_label.clone(),
            attachment_note: attachment_note(config.timeframe_days),
            ..Default::default()
        }
    }
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            window_days: 60,
            contact_address: String::new(),
            max_shown: 10,
            label: "IBS".to_string(),
            attachment_note: attachment_note(365),
            signature: "Sent by the CRS Altmetrics Reporting Tool.".to_string(),
        }
    }
}

fn render_entry(entry: &DigestEntry) -> String {
    format!(
        "Author(s): {}<br>Journal(s): {}<br>Published: {}<br>Title: <a href =\"{}\">{}</a><br>{}",
        entry.authors,
        entry.journal,
        entry.publication_date.format("%Y-%m-%d"),
        entry.details_url,
        entry.title,
        ENTRY_SEPARATOR
    )
}

/// Render the digest body.
///
/// `entries` are expected newest first; the last one determines the "oldest
/// publication" line. An empty slice renders the heading, a no-publications
/// notice and the closing lines.
pub fn compose(entries: &[DigestEntry], options: &DigestOptions, today: NaiveDate) -> String {
    let mut body = format!(
        "<h2>Showing {} Publications from the last {} days: </h2>",
        options.label, options.window_days
    );

    match entries.last() {
        Some(oldest) => body.push_str(&format!(
            "<h4>Oldest publication shown here is {} days old.</h4>",
            age_in_days(today, oldest.publication_date)
        )),
        None => body.push_str("<h4>No publications in this period.</h4>"),
    }

    for entry in entries.iter().take(options.max_shown) {
        body.push_str(&render_entry(entry));
    }

    let extra = entries.len().saturating_sub(options.max_shown);
    if extra != 0 {
        body.push_str(&format!(
            "<h3>Plus {} additional publications in the last {} days. </h3><br>",
            extra, options.window_days
        ));
    }

    body.push_str(&format!(
        "<h3>{}</h3>{} To unsubscribe or for questions, email <a href=\"mailto:{}\">{}</a>",
        options.attachment_note, options.signature, options.contact_address, options.contact_address
    ));
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 4, 1).expect("valid date")
    }

    fn entry(days_old: u64) -> DigestEntry {
        DigestEntry {
            authors: "Test Author".to_string(),
            journal: "Test Journal".to_string(),
            publication_date: today() - chrono::Days::new(days_old),
            title: "Test Title".to_string(),
            details_url: "https://www.altmetric.com/details/101571224".to_string(),
        }
    }

    fn options() -> DigestOptions {
        DigestOptions {
            window_days: 30,
            contact_address: "ralphie_dev@colorado.edu".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_rendering() {
        let body = compose(&[entry(0)], &options(), today());
        assert!(body.contains("Author(s): Test Author<br>"));
        assert!(body.contains("Published: 2021-04-01<br>"));
        assert!(body.contains(
            "Title: <a href =\"https://www.altmetric.com/details/101571224\">Test Title</a><br>"
        ));
        assert!(body.starts_with("<h2>Showing IBS Publications from the last 30 days: </h2>"));
    }

    #[test]
    fn test_closing_line_links_contact() {
        let body = compose(&[entry(0)], &options(), today());
        assert!(body.ends_with(
            "<a href=\"mailto:ralphie_dev@colorado.edu\">ralphie_dev@colorado.edu</a>"
        ));
    }

    #[test]
    fn test_oldest_age_from_last_entry() {
        let body = compose(&[entry(2), entry(9), entry(17)], &options(), today());
        assert!(body.contains("Oldest publication shown here is 17 days old."));
    }

    #[test]
    fn test_overflow_line() {
        let entries: Vec<DigestEntry> = (0..15).map(entry).collect();
        let body = compose(&entries, &options(), today());
        assert_eq!(body.matches("Author(s): ").count(), 10);
        assert!(body.contains("<h3>Plus 5 additional publications in the last 30 days. </h3><br>"));
    }

    #[test]
    fn test_no_overflow_at_limit() {
        let entries: Vec<DigestEntry> = (0..10).map(entry).collect();
        let body = compose(&entries, &options(), today());
        assert_eq!(body.matches("Author(s): ").count(), 10);
        assert!(!body.contains("additional publications"));
    }

    #[test]
    fn test_empty_digest_does_not_fault() {
        let body = compose(&[], &options(), today());
        assert!(body.contains("No publications in this period."));
        assert!(!body.contains("Author(s)"));
        assert!(body.contains("mailto:ralphie_dev@colorado.edu"));
    }

    #[test]
    fn test_attachment_note_follows_table_window() {
        let config = ReportConfig {
            timeframe_days: 90,
            digest_timeframe_days: 30,
            ..Default::default()
        };
        let body = compose(&[entry(1)], &DigestOptions::from_config(&config), today());
        assert!(body.contains(
            "<h3>See Attached CSV for the last 90 days of publications by departmental authors.</h3>"
        ));
        assert!(!body.contains("12 months"));

        let default_body =
            compose(&[entry(1)], &DigestOptions::from_config(&ReportConfig::default()), today());
        assert!(default_body.contains("See Attached CSV for the last 12 months of publications"));
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let mut e = entry(1);
        e.title = "Cats & <i>Dogs</i>".to_string();
        let body = compose(&[e], &options(), today());
        assert!(body.contains(">Cats & <i>Dogs</i></a>"));
    }
}
