//! Date recognition for statement rows.

use chrono::{Datelike, NaiveDate};

/// Formats seen on statements, tried in order. Slash dates are read
/// month-first; the two-digit year form must be tried before `%m/%d/%Y`,
/// which would otherwise accept `24` as year 24.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Smallest year accepted from a four-digit year field. `%Y` takes any
/// digit count, so `01/05/24` would otherwise match `%Y/%m/%d` as 0001-05-24.
const MIN_YEAR: i32 = 1000;

/// Rewrite a recognized date string as `YYYY-MM-DD`.
pub fn canonical_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(trimmed, fmt)
                .ok()
                .filter(|date| date.year() >= MIN_YEAR)
        })
        .map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_passthrough() {
        assert_eq!(canonical_date("2024-01-05").as_deref(), Some("2024-01-05"));
        assert_eq!(canonical_date(" 2024/01/05 ").as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_us_dates() {
        assert_eq!(canonical_date("01/05/2024").as_deref(), Some("2024-01-05"));
        assert_eq!(canonical_date("01/05/24").as_deref(), Some("2024-01-05"));
        assert_eq!(canonical_date("03/07/24").as_deref(), Some("2024-03-07"));
        assert_eq!(canonical_date("12/31/99").as_deref(), Some("1999-12-31"));
    }

    #[test]
    fn test_short_year_fields_are_not_read_as_years() {
        assert_eq!(canonical_date("0024/01/05"), None);
        assert_eq!(canonical_date("05.01.24"), None);
    }

    #[test]
    fn test_named_months() {
        assert_eq!(canonical_date("Jan 05, 2024").as_deref(), Some("2024-01-05"));
        assert_eq!(canonical_date("05 January 2024").as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_dotted_dates() {
        assert_eq!(canonical_date("15.01.2024").as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(canonical_date(""), None);
        assert_eq!(canonical_date("Opening balance"), None);
        assert_eq!(canonical_date("2024-13-01"), None);
    }
}
