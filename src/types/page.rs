//! Decomposes a requested date interval into the observation pages the JMA
//! portal serves, and builds the URL of each page.

use crate::error::AmedasError;
use crate::types::granularity::Granularity;
use crate::types::station::StationCodes;
use chrono::{Datelike, Days, NaiveDate};
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://www.data.jma.go.jp/obd/stats/etrn/view";

/// A single observation page of the portal.
///
/// `month` is set for hourly and daily pages, `day` only for hourly pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchPage {
    pub granularity: Granularity,
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FetchPage {
    pub fn hourly(date: NaiveDate) -> Self {
        Self {
            granularity: Granularity::Hourly,
            year: date.year(),
            month: Some(date.month()),
            day: Some(date.day()),
        }
    }

    pub fn daily(year: i32, month: u32) -> Self {
        Self {
            granularity: Granularity::Daily,
            year,
            month: Some(month),
            day: None,
        }
    }

    pub fn monthly(year: i32) -> Self {
        Self {
            granularity: Granularity::Monthly,
            year,
            month: None,
            day: None,
        }
    }

    /// Builds the page URL for the given station.
    ///
    /// ```
    /// use amedas::{FetchPage, StationCodes};
    /// use chrono::NaiveDate;
    ///
    /// let page = FetchPage::hourly(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
    /// let url = page.url("https://example.org/view", &StationCodes::new(44, "47662"));
    /// assert_eq!(
    ///     url,
    ///     "https://example.org/view/hourly_s1.php?prec_no=44&block_no=47662&year=2023&month=1&day=5&view="
    /// );
    /// ```
    pub fn url(&self, base_url: &str, codes: &StationCodes) -> String {
        format!(
            "{}/{}_{}.php?prec_no={}&block_no={}&year={}&month={}&day={}&view=",
            base_url.trim_end_matches('/'),
            self.granularity.path_segment(),
            codes.kind().page_suffix(),
            codes.prec_no,
            codes.block_no,
            self.year,
            self.month.map(|m| m.to_string()).unwrap_or_default(),
            self.day.map(|d| d.to_string()).unwrap_or_default(),
        )
    }

    /// Human readable key of the page: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    pub fn key(&self) -> String {
        match (self.month, self.day) {
            (Some(month), Some(day)) => format!("{:04}-{:02}-{:02}", self.year, month, day),
            (Some(month), None) => format!("{:04}-{:02}", self.year, month),
            _ => format!("{:04}", self.year),
        }
    }

    /// Compact form of the key used in file names: `YYYYMMDD`, `YYYYMM` or `YYYY`.
    pub fn file_stem(&self) -> String {
        self.key().replace('-', "")
    }
}

impl fmt::Display for FetchPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.granularity, self.key())
    }
}

/// Lists, in chronological order, every page needed to cover `start..=end`.
///
/// Hourly data needs one page per day, daily data one page per month touched by
/// the interval and monthly data one page per year touched by the interval.
///
/// # Errors
///
/// Returns [`AmedasError::InvalidDateRange`] if `start` is after `end`.
pub fn pages_for_range(
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<FetchPage>, AmedasError> {
    if start > end {
        return Err(AmedasError::InvalidDateRange { start, end });
    }

    let pages = match granularity {
        Granularity::Hourly => start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(FetchPage::hourly)
            .collect(),
        Granularity::Daily => {
            let mut pages = Vec::new();
            let mut cursor = start.with_day(1).unwrap_or(start);
            while cursor <= end {
                pages.push(FetchPage::daily(cursor.year(), cursor.month()));
                match cursor.checked_add_months(chrono::Months::new(1)) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
            pages
        }
        Granularity::Monthly => (start.year()..=end.year()).map(FetchPage::monthly).collect(),
    };

    Ok(pages)
}

/// The interval used when the caller leaves one or both ends open: `end`
/// defaults to `today`, `start` to the day before `end`.
pub(crate) fn default_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| end.checked_sub_days(Days::new(1)).unwrap_or(end));
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_hourly_pages_cover_every_day() {
        let pages = pages_for_range(Granularity::Hourly, ymd(2023, 12, 30), ymd(2024, 1, 2))
            .unwrap();
        let keys: Vec<String> = pages.iter().map(FetchPage::key).collect();
        assert_eq!(
            keys,
            ["2023-12-30", "2023-12-31", "2024-01-01", "2024-01-02"]
        );
    }

    #[test]
    fn test_hourly_single_day() {
        let pages =
            pages_for_range(Granularity::Hourly, ymd(2024, 2, 29), ymd(2024, 2, 29)).unwrap();
        assert_eq!(pages, vec![FetchPage::hourly(ymd(2024, 2, 29))]);
    }

    #[test]
    fn test_daily_pages_cover_every_touched_month() {
        let pages =
            pages_for_range(Granularity::Daily, ymd(2023, 11, 30), ymd(2024, 2, 1)).unwrap();
        assert_eq!(
            pages,
            vec![
                FetchPage::daily(2023, 11),
                FetchPage::daily(2023, 12),
                FetchPage::daily(2024, 1),
                FetchPage::daily(2024, 2),
            ]
        );
    }

    #[test]
    fn test_daily_within_one_month() {
        let pages =
            pages_for_range(Granularity::Daily, ymd(2023, 5, 3), ymd(2023, 5, 28)).unwrap();
        assert_eq!(pages, vec![FetchPage::daily(2023, 5)]);
    }

    #[test]
    fn test_monthly_pages_cover_every_touched_year() {
        let pages =
            pages_for_range(Granularity::Monthly, ymd(2021, 12, 31), ymd(2023, 1, 1)).unwrap();
        let keys: Vec<String> = pages.iter().map(FetchPage::key).collect();
        assert_eq!(keys, ["2021", "2022", "2023"]);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let result = pages_for_range(Granularity::Hourly, ymd(2023, 1, 2), ymd(2023, 1, 1));
        assert!(matches!(
            result,
            Err(AmedasError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_urls_per_granularity() {
        let amedas = StationCodes::new(44, "1133");
        let base = DEFAULT_BASE_URL;

        assert_eq!(
            FetchPage::daily(2023, 7).url(base, &amedas),
            "https://www.data.jma.go.jp/obd/stats/etrn/view/daily_a1.php?prec_no=44&block_no=1133&year=2023&month=7&day=&view="
        );
        assert_eq!(
            FetchPage::monthly(2023).url(&format!("{}/", base), &amedas),
            "https://www.data.jma.go.jp/obd/stats/etrn/view/monthly_a1.php?prec_no=44&block_no=1133&year=2023&month=&day=&view="
        );
    }

    #[test]
    fn test_key_and_file_stem() {
        let page = FetchPage::hourly(ymd(2023, 3, 9));
        assert_eq!(page.key(), "2023-03-09");
        assert_eq!(page.file_stem(), "20230309");
        assert_eq!(FetchPage::daily(2023, 3).file_stem(), "202303");
        assert_eq!(FetchPage::monthly(2023).file_stem(), "2023");
        assert_eq!(page.to_string(), "hourly 2023-03-09");
    }

    #[test]
    fn test_default_range() {
        let today = ymd(2024, 3, 1);
        assert_eq!(
            default_range(None, None, today),
            (ymd(2024, 2, 29), ymd(2024, 3, 1))
        );
        assert_eq!(
            default_range(None, Some(ymd(2023, 1, 1)), today),
            (ymd(2022, 12, 31), ymd(2023, 1, 1))
        );
        assert_eq!(
            default_range(Some(ymd(2023, 6, 1)), None, today),
            (ymd(2023, 6, 1), today)
        );
    }
}
