//! Promotion activity windows.
//!
//! Start/end dates originate from free-text email extraction and are stored
//! as strings, so every function here swallows parse failures and returns
//! the inactive/zero default. Promotion data must never crash pricing logic.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses a date-only or date-time string, taking the date portion when a
/// time component trails it (`"2025-11-01 09:00:00"`, `"2025-11-01T09:00"`).
#[must_use]
pub fn parse_promo_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .split('T')
        .next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Last second of the given date.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).unwrap_or_else(|| date.into())
}

/// A promotion is active iff both bounds are present, parse, and
/// `start <= now <= end`, where `end` means end-of-day of its date.
/// Absent or unparsable bounds mean never active.
#[must_use]
pub fn is_active(start: Option<&str>, end: Option<&str>, now: NaiveDateTime) -> bool {
    let (Some(start), Some(end)) = (start, end) else {
        return false;
    };
    let (Some(start), Some(end)) = (parse_promo_date(start), parse_promo_date(end)) else {
        return false;
    };
    let start: NaiveDateTime = start.into();
    start <= now && now <= end_of_day(end)
}

/// Whole days until the promotion's end-of-day mark. Never negative;
/// absent or unparsable end dates yield 0.
#[must_use]
pub fn days_remaining(end: Option<&str>, now: NaiveDateTime) -> i64 {
    let Some(end) = end.and_then(parse_promo_date) else {
        return 0;
    };
    (end_of_day(end) - now).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    // -----------------------------------------------------------------------
    // parse_promo_date
    // -----------------------------------------------------------------------

    #[test]
    fn parses_date_only() {
        assert_eq!(
            parse_promo_date("2025-01-31"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
    }

    #[test]
    fn parses_date_with_trailing_time() {
        assert_eq!(
            parse_promo_date("2025-01-31 09:30:00"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
    }

    #[test]
    fn parses_iso_datetime() {
        assert_eq!(
            parse_promo_date("2025-01-31T09:30:00"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_promo_date("next Tuesday").is_none());
        assert!(parse_promo_date("").is_none());
    }

    // -----------------------------------------------------------------------
    // is_active
    // -----------------------------------------------------------------------

    #[test]
    fn active_inside_window() {
        assert!(is_active(
            Some("2025-01-01"),
            Some("2025-01-31"),
            at("2025-01-15 12:00:00")
        ));
    }

    #[test]
    fn end_date_covers_the_whole_final_day() {
        assert!(is_active(
            Some("2025-01-01"),
            Some("2025-01-31"),
            at("2025-01-31 23:00:00")
        ));
    }

    #[test]
    fn inactive_just_after_window() {
        assert!(!is_active(
            Some("2025-01-01"),
            Some("2025-01-31"),
            at("2025-02-01 00:01:00")
        ));
    }

    #[test]
    fn inactive_before_start() {
        assert!(!is_active(
            Some("2025-01-10"),
            Some("2025-01-31"),
            at("2025-01-09 23:59:59")
        ));
    }

    #[test]
    fn missing_either_bound_is_inactive() {
        let now = at("2025-01-15 12:00:00");
        assert!(!is_active(None, Some("2025-01-31"), now));
        assert!(!is_active(Some("2025-01-01"), None, now));
        assert!(!is_active(None, None, now));
    }

    #[test]
    fn unparsable_bound_is_inactive() {
        assert!(!is_active(
            Some("soon"),
            Some("2025-01-31"),
            at("2025-01-15 12:00:00")
        ));
    }

    // -----------------------------------------------------------------------
    // days_remaining
    // -----------------------------------------------------------------------

    #[test]
    fn days_remaining_counts_to_end_of_day() {
        assert_eq!(
            days_remaining(Some("2025-01-31"), at("2025-01-21 12:00:00")),
            10
        );
    }

    #[test]
    fn days_remaining_never_negative() {
        assert_eq!(
            days_remaining(Some("2025-01-31"), at("2025-03-01 00:00:00")),
            0
        );
    }

    #[test]
    fn days_remaining_zero_on_missing_or_bad_date() {
        assert_eq!(days_remaining(None, at("2025-01-01 00:00:00")), 0);
        assert_eq!(days_remaining(Some("TBD"), at("2025-01-01 00:00:00")), 0);
    }
}
