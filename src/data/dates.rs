use crate::error::{CountrysplitError, Result};
use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use polars::prelude::*;

pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Month-only formats, read as the first of the month
pub const MONTH_FORMATS: [&str; 2] = ["%Y-%m", "%Y/%m"];

/// Parse a calendar date in one of `DATE_FORMATS` or `MONTH_FORMATS`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Timestamps like "2020-03-01 00:00:00" or "2020-03-01T00:00:00"
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return Some(date);
        }
    }
    let first_of_month = format!("{}|01", date_part);
    MONTH_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(&first_of_month, &format!("{}|%d", format)).ok()
    })
}

/// Step back `n` month starts from `date`.
///
/// The first step lands on the start of the current month unless `date` already is one,
/// so `2020-05-15` minus 4 gives `2020-02-01` while `2020-05-01` minus 4 gives `2020-01-01`.
pub fn month_begin_back(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    if n == 0 {
        return Some(date);
    }
    let month_start = date.with_day(1)?;
    let steps = if date.day() == 1 { n } else { n - 1 };
    month_start.checked_sub_months(Months::new(steps))
}

/// Read a column of dates, accepting native date/datetime columns or strings
pub fn column_dates(column: &Column) -> Result<Vec<Option<NaiveDate>>> {
    match column.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let days = column.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| {
                CountrysplitError::DataLoading("Invalid epoch date".to_string())
            })?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(|d| epoch.checked_add_signed(TimeDelta::days(d as i64))))
                .collect())
        }
        _ => {
            let strings = column.cast(&DataType::String)?;
            let strings = strings.str()?;
            let mut dates = Vec::with_capacity(strings.len());
            for (row, raw) in strings.into_iter().enumerate() {
                match raw {
                    None => dates.push(None),
                    Some(raw) => {
                        let date = parse_date(raw).ok_or_else(|| {
                            CountrysplitError::DataLoading(format!(
                                "Unparsable date '{}' in column '{}' at row {}",
                                raw,
                                column.name(),
                                row
                            ))
                        })?;
                        dates.push(Some(date));
                    }
                }
            }
            Ok(dates)
        }
    }
}
