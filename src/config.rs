//! Report configuration.
//!
//! Defaults mirror the weekly departmental report: a 12 month CSV window,
//! a 60 day email digest window and the standard roster exclusions.

use crate::error::{AltmetricError, Result};
use std::time::Duration;

/// Courtesy delay before every listing request
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Department names that are roster groupings rather than real departments
pub const DEFAULT_DEPARTMENT_EXCLUSIONS: &[&str] = &[
    "Research Professors",
    "Other Faculty Titles",
    "Regular Faculty",
    "Rostered Tenure Track Faculty",
    "Postdocs",
    "Organisation",
];

/// Affiliations redundant for every record of the institution
pub const DEFAULT_AFFILIATION_EXCLUSIONS: &[&str] = &["University of Colorado Boulder"];

/// Settings shared by ingestion, projection and digest composition
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Table (CSV) window in days
    pub timeframe_days: i64,
    /// Digest (email) window in days, must not exceed `timeframe_days`
    pub digest_timeframe_days: i64,
    /// Maximum entries rendered in the digest before the overflow line
    pub max_shown: usize,
    pub department_exclusions: Vec<String>,
    pub affiliation_exclusions: Vec<String>,
    /// Address quoted in the digest's unsubscribe line
    pub contact_address: String,
    /// Unit named in the digest heading
    pub digest_label: String,
    /// Sleep inserted before each listing request
    pub page_delay: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timeframe_days: 365,
            digest_timeframe_days: 60,
            max_shown: 10,
            department_exclusions: DEFAULT_DEPARTMENT_EXCLUSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            affiliation_exclusions: DEFAULT_AFFILIATION_EXCLUSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            contact_address: String::new(),
            digest_label: "IBS".to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl ReportConfig {
    /// Check window ordering so every digest entry is also a table row
    pub fn validate(&self) -> Result<()> {
        if self.timeframe_days <= 0 || self.digest_timeframe_days <= 0 {
            return Err(AltmetricError::Validation(format!(
                "windows must be positive (table {}, digest {})",
                self.timeframe_days, self.digest_timeframe_days
            )));
        }
        if self.digest_timeframe_days > self.timeframe_days {
            return Err(AltmetricError::Validation(format!(
                "digest window ({} days) exceeds table window ({} days)",
                self.digest_timeframe_days, self.timeframe_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ReportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.department_exclusions.len(), 6);
        assert_eq!(config.page_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_digest_window_larger_than_table_rejected() {
        let config = ReportConfig {
            timeframe_days: 30,
            digest_timeframe_days: 60,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AltmetricError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = ReportConfig {
            digest_timeframe_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
