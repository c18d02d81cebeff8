//! CSV export of the projected table.

use crate::error::Result;
use crate::projector::Table;
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// File name used for the dated attachment, e.g. `Altmetric Pubs 2021-04-01.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("Altmetric Pubs {}.csv", date.format("%Y-%m-%d"))
}

/// Write the header row followed by every table row
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(table.header())?;
    for row in table.rows() {
        wtr.write_record(row.to_record())?;
    }

    wtr.flush()?;
    Ok(())
}

/// Save the table to a CSV file
pub fn save_csv(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(table, file)?;
    info!(path = ?path, rows = table.len(), "Saved CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityMap;
    use crate::ingest::RawRecord;
    use crate::projector::{project, ProjectionWindows};
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2021, 4, 1).expect("valid date");
        assert_eq!(export_file_name(date), "Altmetric Pubs 2021-04-01.csv");
    }

    #[test]
    fn test_empty_table_writes_header_only() -> Result<()> {
        let mut buffer = Vec::new();
        write_csv(&Table::default(), &mut buffer)?;
        let text = String::from_utf8_lossy(&buffer);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Altmetric Attention Score,Publication Date,"));
        assert!(text.trim_end().ends_with("ISBN,Details Page URL"));
        Ok(())
    }

    #[test]
    fn test_save_and_read_back() -> Result<()> {
        let record: RawRecord = serde_json::from_value(json!({
            "id": "42",
            "attributes": {
                "title": "Commas, quoted",
                "publication-date": "2021-03-06",
                "altmetric-score": 3.5,
                "badge-url": "https://api.altmetric.com/v1/donut/42_240.png",
                "identifiers": {"isbns": ["978-3-16-148410-0"]}
            }
        }))?;
        let today = NaiveDate::from_ymd_opt(2021, 4, 1).expect("valid date");
        let projection = project(&[record], &EntityMap::new(), ProjectionWindows::default(), today)?;

        let temp = NamedTempFile::new()?;
        save_csv(&projection.table, temp.path())?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(temp.path())?;
        let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3.5");
        assert_eq!(&rows[0][1], "2021-03-06");
        assert_eq!(&rows[0][3], "Commas, quoted");
        assert_eq!(&rows[0][14], "978-3-16-148410-0");
        assert_eq!(&rows[0][15], "https://www.altmetric.com/details/42");
        Ok(())
    }
}
