use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;

/// Layouts with a time component, tried in order. The vendor emits
/// different layouts per report surface, so no single format can be
/// assumed for header or transaction dates.
static DATETIME_LAYOUTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d %b %Y %H:%M:%S",
    ]
});

/// Date-only layouts; these resolve to midnight UTC.
static DATE_LAYOUTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d %b %Y", "%b %d, %Y"]
});

/// Parse a report date string in any accepted layout → millis UTC.
/// Naive inputs are interpreted as UTC.
pub fn parse_timestamp_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for layout in DATETIME_LAYOUTS.iter() {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    for layout in DATE_LAYOUTS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc().timestamp_millis());
        }
    }

    None
}
