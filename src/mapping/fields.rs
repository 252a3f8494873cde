//! Total translations of TheHive enumerations and timestamps.
//!
//! None of these fail: unknown input maps to a fixed fallback.

use chrono::DateTime;
use serde::Serialize;

use crate::catalyst::TicketStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "Unknown",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::VeryHigh => "Very High",
        }
    }
}

/// Traffic light protocol level, also used for PAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tlp {
    White,
    Green,
    Amber,
    Red,
}

impl Tlp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tlp::White => "White",
            Tlp::Green => "Green",
            Tlp::Amber => "Amber",
            Tlp::Red => "Red",
        }
    }
}

/// Renders epoch milliseconds as an ISO-8601 UTC timestamp with a `Z` suffix.
///
/// Fractional seconds are printed with microsecond precision and only when
/// non-zero. Instants outside the representable range map to `None`.
pub fn map_time(millis: Option<i64>) -> Option<String> {
    let instant = DateTime::from_timestamp_millis(millis?)?;
    let format = if instant.timestamp_subsec_micros() == 0 {
        "%Y-%m-%dT%H:%M:%SZ"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6fZ"
    };
    Some(instant.format(format).to_string())
}

pub fn map_status(status: &str) -> TicketStatus {
    match status {
        "Open" | "New" => TicketStatus::Open,
        _ => TicketStatus::Closed,
    }
}

pub fn map_tlp(level: Option<i64>) -> Tlp {
    match level {
        Some(0) => Tlp::White,
        Some(1) => Tlp::Green,
        Some(2) => Tlp::Amber,
        Some(3) => Tlp::Red,
        _ => Tlp::White,
    }
}

pub fn map_severity(level: Option<i64>) -> Severity {
    match level {
        Some(1) => Severity::Low,
        Some(2) => Severity::Medium,
        Some(3) => Severity::High,
        Some(4) => Severity::VeryHigh,
        _ => Severity::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn parse_back(rendered: &str) -> i64 {
        let naive = rendered.strip_suffix('Z').unwrap();
        NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_map_time_null() {
        assert_eq!(map_time(None), None);
    }

    #[test]
    fn test_map_time_epoch() {
        assert_eq!(map_time(Some(0)).as_deref(), Some("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn test_map_time_with_fraction() {
        assert_eq!(
            map_time(Some(1495012062014)).as_deref(),
            Some("2017-05-17T09:07:42.014000Z")
        );
        assert_eq!(
            map_time(Some(1638703980000)).as_deref(),
            Some("2021-12-05T11:33:00Z")
        );
    }

    #[test]
    fn test_map_time_round_trips() {
        for millis in [0, 1, 999, 1000, -1, 1495012062014, 1638729992590, 4102444800123] {
            let rendered = map_time(Some(millis)).unwrap();
            assert!(rendered.ends_with('Z'), "{}", rendered);
            assert_eq!(parse_back(&rendered), millis, "{}", rendered);
        }
    }

    #[test]
    fn test_map_time_out_of_range() {
        assert_eq!(map_time(Some(i64::MAX)), None);
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("Open"), TicketStatus::Open);
        assert_eq!(map_status("New"), TicketStatus::Open);
        for other in ["", "open", "NEW", "Resolved", "Deleted", "InProgress"] {
            assert_eq!(map_status(other), TicketStatus::Closed, "{:?}", other);
        }
    }

    #[test]
    fn test_map_tlp() {
        assert_eq!(map_tlp(Some(0)), Tlp::White);
        assert_eq!(map_tlp(Some(1)), Tlp::Green);
        assert_eq!(map_tlp(Some(2)), Tlp::Amber);
        assert_eq!(map_tlp(Some(3)), Tlp::Red);
        for other in [Some(-1), Some(4), Some(100), None] {
            assert_eq!(map_tlp(other), Tlp::White);
        }
    }

    #[test]
    fn test_map_severity() {
        assert_eq!(map_severity(Some(1)), Severity::Low);
        assert_eq!(map_severity(Some(2)), Severity::Medium);
        assert_eq!(map_severity(Some(3)), Severity::High);
        assert_eq!(map_severity(Some(4)), Severity::VeryHigh);
        for other in [Some(0), Some(5), Some(-3), None] {
            assert_eq!(map_severity(other), Severity::Unknown);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Severity::VeryHigh.as_str(), "Very High");
        assert_eq!(serde_json::to_string(&Severity::VeryHigh).unwrap(), r#""Very High""#);
        assert_eq!(Tlp::Amber.as_str(), "Amber");
    }
}
