use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Coerce the date spellings found in real-world feeds into UTC.
///
/// Tries, in order: RFC 2822 (`pubDate` in RSS), RFC 3339 (Atom
/// `published`/`updated`), then a couple of sloppy naive formats that show
/// up in the wild, interpreted as UTC. Returns `None` for anything else —
/// an unparseable date never fails the parse, the field just stays unset.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // ISO-ish without an offset: take it as UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    tracing::trace!(date = s, "unparseable date");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc2822_gmt() {
        let dt = parse_date("Mon, 01 Jan 2024 00:00:00 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc2822_offset() {
        let dt = parse_date("Tue, 02 Jan 2024 12:30:00 +0230").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339() {
        let dt = parse_date("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());

        let dt = parse_date("2024-01-01T12:00:00+01:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_fallbacks() {
        let dt = parse_date("2024-01-01T12:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());

        let dt = parse_date("2024-01-01 12:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());

        let dt = parse_date("2024-01-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_and_empty() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("next Tuesday"), None);
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        assert!(parse_date("  2024-01-01T12:00:00Z\n").is_some());
    }
}
