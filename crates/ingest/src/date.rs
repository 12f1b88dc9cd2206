use std::fmt;

use chrono::NaiveDate;

/// A single unparseable date value, with the reason parsing gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    pub value: String,
    pub reason: String,
}

impl DateParseError {
    fn new(value: &str, reason: &str) -> Self {
        DateParseError {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot parse date '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for DateParseError {}

/// Explicit formats tried in order before any free-text interpretation.
/// `01/02/2024` must resolve day-first here and never reach the fallback.
const KNOWN_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%Y%m%d",
];

/// Normalize one raw date cell to a calendar date.
///
/// Tries the known formats first, then a day-first free-text pass that
/// tolerates alternate separators, ordinal suffixes and month names in any
/// position. The free-text pass requires a four-digit year.
pub fn normalize(value: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::new(trimmed, "Empty string provided"));
    }

    for fmt in KNOWN_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }

    parse_freeform(trimmed).ok_or_else(|| DateParseError::new(trimmed, "Unknown format"))
}

// ---------------------------------------------------------------------------
// Free-text fallback
// ---------------------------------------------------------------------------

fn month_number(token: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    for (i, name) in MONTHS.iter().enumerate() {
        if token == *name || token == &name[..3] || (token == "sept" && i == 8) {
            return Some(i as u32 + 1);
        }
    }
    None
}

/// Strip an ordinal suffix ("1st", "22nd", "3rd", "15th") down to digits.
fn strip_ordinal(token: &str) -> Option<&str> {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(digits) = token.strip_suffix(suffix) {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return Some(digits);
            }
        }
    }
    None
}

fn parse_freeform(value: &str) -> Option<NaiveDate> {
    let mut month_from_name: Option<u32> = None;
    let mut year: Option<i32> = None;
    let mut numbers: Vec<u32> = Vec::new();

    for raw in value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let token = raw.to_ascii_lowercase();
        let digits = if token.bytes().all(|b| b.is_ascii_digit()) {
            Some(token.as_str())
        } else {
            strip_ordinal(&token)
        };

        if let Some(digits) = digits {
            let n: u32 = digits.parse().ok()?;
            if digits.len() == 4 {
                if year.is_some() {
                    return None;
                }
                year = Some(n as i32);
            } else if n >= 1 && n <= 31 {
                numbers.push(n);
            } else {
                return None;
            }
        } else if let Some(m) = month_number(&token) {
            if month_from_name.is_some() {
                return None;
            }
            month_from_name = Some(m);
        } else {
            return None;
        }
    }

    let year = year?;
    match (month_from_name, numbers.as_slice()) {
        (Some(month), [day]) => NaiveDate::from_ymd_opt(year, month, *day),
        // Day-first for numeric pairs; an impossible reading falls back to
        // month-first the way lenient parsers do.
        (None, [first, second]) => NaiveDate::from_ymd_opt(year, *second, *first)
            .or_else(|| NaiveDate::from_ymd_opt(year, *first, *second)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn known_formats_parse() {
        assert_eq!(normalize("2024-01-15").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15-01-2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15/01/2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("2024/01/15").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15.01.2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15-Jan-2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15 Jan 2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15-January-2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("20240115").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn ambiguous_numeric_dates_read_day_first() {
        // Explicit %d/%m/%Y wins before any free-text interpretation.
        assert_eq!(normalize("01/02/2024").unwrap(), date(2024, 2, 1));
        assert_eq!(normalize("01-02-2024").unwrap(), date(2024, 2, 1));
    }

    #[test]
    fn freeform_handles_month_names_and_ordinals() {
        assert_eq!(normalize("January 15, 2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("15th Jan 2024").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("2024 Jan 15").unwrap(), date(2024, 1, 15));
        assert_eq!(normalize("1st September 2023").unwrap(), date(2023, 9, 1));
    }

    #[test]
    fn freeform_numeric_pair_falls_back_to_month_first() {
        // Day-first reads 12 as the day and 25 as the month; that is
        // impossible, so the pair is re-read month-first.
        assert_eq!(normalize("2024 12 25").unwrap(), date(2024, 12, 25));
        // Day-first reading stays when it is possible.
        assert_eq!(normalize("2024 05 04").unwrap(), date(2024, 4, 5));
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(normalize("  2024-01-15  ").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = normalize("").unwrap_err();
        assert_eq!(err.reason, "Empty string provided");
        let err = normalize("   ").unwrap_err();
        assert_eq!(err.reason, "Empty string provided");
    }

    #[test]
    fn garbage_is_an_error_with_the_value_preserved() {
        let err = normalize("not-a-date").unwrap_err();
        assert_eq!(err.value, "not-a-date");
        assert_eq!(err.reason, "Unknown format");
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn impossible_dates_are_errors() {
        assert!(normalize("32/01/2024").is_err());
        assert!(normalize("2024-02-30").is_err());
    }
}
