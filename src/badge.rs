//! Badge image URL → details page URL.
//!
//! Every research output carries a donut badge like
//! `https://api.altmetric.com/v1/donut/83360707_240.png`; the number is the
//! Altmetric ID used by the public details page.

use regex::Regex;
use std::sync::LazyLock;

/// Public details page prefix
pub const DETAILS_URL_PREFIX: &str = "https://www.altmetric.com/details/";

static DONUT_BADGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://api\.altmetric\.com/v1/donut/([0-9]+)_240\.png")
        .expect("donut badge pattern is valid")
});

/// Altmetric ID embedded in a donut badge URL
pub fn altmetric_id(badge_url: &str) -> Option<&str> {
    DONUT_BADGE
        .captures(badge_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Details page URL for a donut badge URL, `None` when the pattern doesn't match
pub fn badge_to_details_url(badge_url: &str) -> Option<String> {
    altmetric_id(badge_url).map(|id| format!("{}{}", DETAILS_URL_PREFIX, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_to_details_url() {
        assert_eq!(
            badge_to_details_url("https://api.altmetric.com/v1/donut/83360707_240.png").as_deref(),
            Some("https://www.altmetric.com/details/83360707")
        );
    }

    #[test]
    fn test_non_matching_badges() {
        assert!(badge_to_details_url("").is_none());
        assert!(badge_to_details_url("https://api.altmetric.com/v1/donut/83360707_64.png").is_none());
        assert!(badge_to_details_url("https://api.altmetric.com/v1/donut/_240.png").is_none());
        assert!(badge_to_details_url("http://example.com/https://api.altmetric.com/v1/donut/1_240.png").is_none());
    }

    #[test]
    fn test_altmetric_id() {
        assert_eq!(
            altmetric_id("https://api.altmetric.com/v1/donut/101571224_240.png"),
            Some("101571224")
        );
    }
}
