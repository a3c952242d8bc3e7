use chrono::{Months, NaiveDate};
use std::fmt;

/// A calendar year, e.g. `Year(2023)`. As a date it spans January 1st to
/// December 31st.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Year(pub i32);

impl Year {
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 1, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 12, 31)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// A calendar month as `Month(year, month)`, with `month` in `1..=12`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);

impl Month {
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, self.1, 1)
    }

    /// `None` when the month is out of range.
    pub fn last_day(self) -> Option<NaiveDate> {
        self.first_day()?
            .checked_add_months(Months::new(1))?
            .pred_opt()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

/// An inclusive span of calendar days.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StartEndDate {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_last_day() {
        let last = |y, m| Month(y, m).last_day().map(|d| d.to_string());
        assert_eq!(last(2023, 1).as_deref(), Some("2023-01-31"));
        assert_eq!(last(2023, 2).as_deref(), Some("2023-02-28"));
        assert_eq!(last(2024, 2).as_deref(), Some("2024-02-29"));
        assert_eq!(last(2023, 12).as_deref(), Some("2023-12-31"));
        assert_eq!(last(2023, 13), None);
        assert_eq!(last(2023, 0), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Year(812).to_string(), "0812");
        assert_eq!(Month(2023, 4).to_string(), "2023-04");
    }
}
