//! Value formatting for dates, amounts and the current-date line.
//!
//! The per-field formatters return `Err(RawPassthrough)` when the input does
//! not have the expected shape. Callers put the raw text into the document
//! unchanged in that case instead of failing the request.

use chrono::{Datelike, NaiveDate};

/// Input that a formatter could not interpret, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPassthrough(pub String);

impl RawPassthrough {
    pub fn into_raw(self) -> String {
        self.0
    }
}

/// Converts `YYYY-MM-DD` (what an HTML date input submits) to `DD/MM/YYYY`.
pub fn convert_date_format(raw: &str) -> Result<String, RawPassthrough> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format("%d/%m/%Y").to_string())
        .map_err(|_| RawPassthrough(raw.to_string()))
}

/// Groups digits the Indian way: `1234567` becomes `12,34,567`.
///
/// The last three digits form one group and everything before them is split
/// into pairs from the right. Inputs of three characters or fewer are returned
/// as they are. A decimal fraction is kept and only the integer part is
/// grouped.
pub fn format_number_indian(raw: &str) -> Result<String, RawPassthrough> {
    if raw.len() <= 3 {
        return Ok(raw.to_string());
    }

    let (integer, fraction) = match raw.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (raw, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) || fraction.is_some_and(|f| !all_digits(f)) {
        return Err(RawPassthrough(raw.to_string()));
    }

    let grouped = group_digits(integer);
    Ok(match fraction {
        Some(fraction) => format!("{}.{}", grouped, fraction),
        None => grouped,
    })
}

fn group_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (rest, last_three) = digits.split_at(digits.len() - 3);

    let mut pairs = Vec::with_capacity(rest.len() / 2 + 1);
    let mut end = rest.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        pairs.push(&rest[start..end]);
        end = start;
    }
    pairs.reverse();

    format!("{},{}", pairs.join(","), last_three)
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `5th March, 2024`, or `5th day of March, 2024` when `day_of` is set.
pub fn format_current_date(date: NaiveDate, day_of: bool) -> String {
    let day = date.day();
    format!(
        "{}{}{} {}",
        day,
        ordinal_suffix(day),
        if day_of { " day of" } else { "" },
        date.format("%B, %Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates_become_day_month_year() {
        assert_eq!(convert_date_format("2024-02-01").unwrap(), "01/02/2024");
        assert_eq!(convert_date_format("1999-12-31").unwrap(), "31/12/1999");
    }

    #[test]
    fn malformed_dates_pass_through() {
        for raw in ["", "01/02/2024", "2024-13-01", "yesterday"] {
            assert_eq!(
                convert_date_format(raw),
                Err(RawPassthrough(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn date_conversion_is_idempotent_through_passthrough() {
        let once = convert_date_format("2024-02-01").unwrap();
        let twice = convert_date_format(&once).unwrap_or_else(RawPassthrough::into_raw);
        assert_eq!(once, twice);
    }

    #[test]
    fn indian_grouping() {
        let cases = [
            ("", ""),
            ("7", "7"),
            ("100", "100"),
            ("1000", "1,000"),
            ("12345", "12,345"),
            ("123456", "1,23,456"),
            ("1234567", "12,34,567"),
            ("123456789", "12,34,56,789"),
            ("1234567.50", "12,34,567.50"),
        ];
        for (input, expected) in cases {
            assert_eq!(format_number_indian(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn non_numeric_amounts_pass_through() {
        for raw in ["12a45", "1,000", "-12345", "12.3.4", "1234."] {
            assert_eq!(
                format_number_indian(raw),
                Err(RawPassthrough(raw.to_string())),
                "{raw}"
            );
        }
        assert_eq!(format_number_indian("abc").unwrap(), "abc");
    }

    #[test]
    fn ordinal_suffixes() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "{day}");
        }
    }

    #[test]
    fn current_date_line() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 22).unwrap();
        assert_eq!(format_current_date(date, false), "22nd March, 2024");
        assert_eq!(format_current_date(date, true), "22nd day of March, 2024");

        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        assert_eq!(format_current_date(date, false), "11th January, 2025");
    }
}
