use std::ops::RangeInclusive;
use chrono::{Datelike, NaiveDate, ParseResult};

pub(crate) fn parse_date(s: &str, format: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s, format)
}

pub(crate) fn format_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

/// First and last day of the given year
pub(crate) fn year_of(year: i32) -> Option<RangeInclusive<NaiveDate>> {
    let first_day = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last_day = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(first_day..=last_day)
}

/// First and last day of a month, based on current date. If the month given is in future return the
/// same month in last year. E.g. if today is 2024-03-10, input 6 returns June 2023 and input 3 returns
/// March 2024.
pub(crate) fn month_of(month: u32, today: NaiveDate) -> Option<RangeInclusive<NaiveDate>> {
    if !(1..=12).contains(&month) {
        return None;
    }

    let year = if month > today.month() { today.year() - 1 } else { today.year() };
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let first_day_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some(first_day..=first_day_next_month.pred_opt()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_round_trip() {
        for s in ["01-03-2024", "29-02-2024", "31-12-1999", "15-07-2030"] {
            let date = parse_date(s, "%d-%m-%Y").unwrap();
            assert_eq!(format_date(date, "%d-%m-%Y"), s);
        }
    }

    #[test]
    fn test_invalid_dates() {
        for s in ["31-02-2024", "2024-03-01", "01/03/2024", "", "tomorrow", "32-01-2024"] {
            assert!(parse_date(s, "%d-%m-%Y").is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn test_year_of() {
        assert_eq!(year_of(2024), Some(ymd(2024, 1, 1)..=ymd(2024, 12, 31)));
    }

    #[test]
    fn test_month_of() {
        let today = ymd(2024, 3, 10);
        assert_eq!(month_of(3, today), Some(ymd(2024, 3, 1)..=ymd(2024, 3, 31)));
        assert_eq!(month_of(2, today), Some(ymd(2024, 2, 1)..=ymd(2024, 2, 29)));
        assert_eq!(month_of(6, today), Some(ymd(2023, 6, 1)..=ymd(2023, 6, 30)));
        assert_eq!(month_of(12, today), Some(ymd(2023, 12, 1)..=ymd(2023, 12, 31)));
        assert_eq!(month_of(0, today), None);
        assert_eq!(month_of(13, today), None);
    }
}
