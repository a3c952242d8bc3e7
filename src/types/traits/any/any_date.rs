use crate::types::traits::types::{Month, StartEndDate, Year};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Anything that can be resolved into an inclusive span of calendar days.
///
/// A single day resolves to itself. Coarser values such as [`Year`] or [`Month`]
/// resolve to their first and last day, so they can be used both as the start
/// and as the end of a requested interval.
pub trait AnyDate {
    fn get_date_range(self) -> Option<StartEndDate>;
}

impl AnyDate for NaiveDate {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self,
            end: self,
        })
    }
}

impl AnyDate for NaiveDateTime {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.date().get_date_range()
    }
}

impl AnyDate for DateTime<Utc> {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.date_naive().get_date_range()
    }
}

impl AnyDate for DateTime<FixedOffset> {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.date_naive().get_date_range()
    }
}

impl AnyDate for &str {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.to_string().get_date_range()
    }
}

impl AnyDate for String {
    fn get_date_range(self) -> Option<StartEndDate> {
        let trimmed = self.trim();
        if let Ok(naive_date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return naive_date.get_date_range();
        }
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return naive_dt.get_date_range();
        }
        if let Ok(naive_date) = NaiveDate::parse_from_str(trimmed, "%Y%m%d") {
            return naive_date.get_date_range();
        }
        None
    }
}

impl AnyDate for Year {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self.first_day()?,
            end: self.last_day()?,
        })
    }
}

impl AnyDate for Month {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self.first_day()?,
            end: self.last_day()?,
        })
    }
}

/// One end of a requested interval, resolved eagerly from any [`AnyDate`] value.
///
/// Builder setters take `impl Into<DateBound>`, so any [`AnyDate`] can be passed
/// directly. Values that cannot be read as a date are kept as unresolved and
/// rejected when the request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBound(Option<StartEndDate>);

impl DateBound {
    /// First day of the bound, for use as the start of an interval.
    pub fn first_day(self) -> Option<NaiveDate> {
        self.0.map(|range| range.start)
    }

    /// Last day of the bound, for use as the end of an interval.
    pub fn last_day(self) -> Option<NaiveDate> {
        self.0.map(|range| range.end)
    }
}

impl<T: AnyDate> From<T> for DateBound {
    fn from(value: T) -> Self {
        DateBound(value.get_date_range())
    }
}
