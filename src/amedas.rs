//! Main entry point of the crate: the [`Amedas`] client resolves station names
//! against the AMeDAS station table and downloads observation pages from the
//! JMA `etrn` portal for a requested interval.

use crate::error::AmedasError;
use crate::stations::station_list::{StationList, BINCODE_CACHE_FILE_NAME, STATION_LIST_URL};
use crate::types::granularity::Granularity;
use crate::types::page::{default_range, pages_for_range, DEFAULT_BASE_URL};
use crate::types::station::Station;
use crate::types::traits::any::any_date::DateBound;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use crate::weather_data::frame_fetcher::FrameFetcher;
use crate::weather_data::frame_writer::{write_csv, OutputLayout};
use crate::weather_data::page_loader::{PageLoader, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::{DailyClient, HourlyClient, MonthlyClient};
use bon::{bon, Builder};
use chrono::{NaiveDate, Utc};
use log::info;
use polars::prelude::DataFrame;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory CSV files are written below when no output directory is given.
pub const DEFAULT_OUT_DIR: &str = "csv";

/// Settings used to construct an [`Amedas`] client.
///
/// # Examples
///
/// ```
/// use amedas::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::builder()
///     .station_list_path("AMeDAS_list.csv")
///     .timeout(Duration::from_secs(10))
///     .build();
/// assert_eq!(options.timeout, Duration::from_secs(10));
/// assert_eq!(options.base_url, "https://www.data.jma.go.jp/obd/stats/etrn/view");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClientOptions {
    /// Where the station table is cached. Defaults to the system cache directory.
    #[builder(into)]
    pub cache_dir: Option<PathBuf>,
    /// Remote tab separated station table.
    #[builder(into, default = STATION_LIST_URL.to_string())]
    pub station_list_url: String,
    /// Local station table, read instead of the cache and the remote table.
    #[builder(into)]
    pub station_list_path: Option<PathBuf>,
    /// Base URL of the observation pages.
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,
    /// Timeout of a single HTTP request.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The client for downloading JMA observation tables.
///
/// Create an instance with [`Amedas::new()`] (default cache directory),
/// [`Amedas::with_cache_folder()`] or [`Amedas::with_options()`].
///
/// # Examples
///
/// ```no_run
/// # use amedas::{Amedas, AmedasError, Granularity};
/// # #[tokio::main]
/// # async fn main() -> Result<(), AmedasError> {
/// let client = Amedas::new().await?;
/// let frame = client
///     .fetch()
///     .station("東京")
///     .granularity(Granularity::Daily)
///     .start("2023-01-01")
///     .end("2023-03-31")
///     .call()
///     .await?;
/// println!("{}", frame);
/// # Ok(())
/// # }
/// ```
pub struct Amedas {
    cache_dir: PathBuf,
    station_list: StationList,
    fetcher: FrameFetcher,
}

#[bon]
impl Amedas {
    /// Creates a client using the given options.
    ///
    /// The cache directory is created if it doesn't exist and the station table
    /// is loaded right away.
    ///
    /// # Errors
    ///
    /// * [`AmedasError::CacheDirResolution`] if no cache directory was given and
    ///   the system one cannot be determined.
    /// * [`AmedasError::CacheDirCreation`] if the cache directory cannot be created.
    /// * [`AmedasError::WeatherData`] if the HTTP client cannot be built.
    /// * [`AmedasError::LocateStation`] if the station table cannot be loaded.
    pub async fn with_options(options: ClientOptions) -> Result<Self, AmedasError> {
        let cache_dir = match options.cache_dir {
            Some(dir) => dir,
            None => get_cache_dir().map_err(AmedasError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_dir)
            .await
            .map_err(|e| AmedasError::CacheDirCreation(cache_dir.clone(), e))?;

        let client = PageLoader::build_client(&options.user_agent, options.timeout)?;
        let station_list = StationList::load(
            &client,
            &cache_dir,
            &options.station_list_url,
            options.station_list_path.as_deref(),
        )
        .await?;
        info!("Station table holds {} stations", station_list.len());

        Ok(Self {
            cache_dir,
            station_list,
            fetcher: FrameFetcher::new(PageLoader::new(client), &options.base_url),
        })
    }

    /// Creates a client that caches the station table in `cache_folder`.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, AmedasError> {
        Self::with_options(ClientOptions::builder().cache_dir(cache_folder).build()).await
    }

    /// Creates a client with default options, caching in the system cache
    /// directory (e.g. `~/.cache/amedas_rs_cache` on Linux).
    pub async fn new() -> Result<Self, AmedasError> {
        Self::with_options(ClientOptions::default()).await
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolves a station name, optionally narrowed down by group, to a single station.
    ///
    /// ```no_run
    /// # use amedas::{Amedas, AmedasError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), AmedasError> {
    /// let client = Amedas::new().await?;
    /// let takamatsu = client.station("高松", Some("香川県"))?;
    /// assert_eq!(takamatsu.prec_no, 72);
    /// # Ok(())
    /// # }
    /// ```
    pub fn station(&self, name: &str, group: Option<&str>) -> Result<&Station, AmedasError> {
        Ok(self.station_list.resolve(name, group)?)
    }

    pub fn stations(&self) -> &[Station] {
        self.station_list.stations()
    }

    /// Stations whose name contains `fragment`.
    pub fn search_stations(&self, fragment: &str) -> Vec<&Station> {
        self.station_list.search(fragment)
    }

    /// Deletes the cached station table of this client.
    ///
    /// Returns whether a cache file was removed.
    pub async fn clear_cache(&self) -> Result<bool, AmedasError> {
        Self::clear_cache_dir(Some(&self.cache_dir)).await
    }

    /// Deletes the cached station table in `cache_dir`, or in the system cache
    /// directory when `None`, without loading the table first.
    pub async fn clear_cache_dir(cache_dir: Option<&Path>) -> Result<bool, AmedasError> {
        let cache_dir = match cache_dir {
            Some(dir) => dir.to_path_buf(),
            None => get_cache_dir().map_err(AmedasError::CacheDirResolution)?,
        };
        let cache_file = cache_dir.join(BINCODE_CACHE_FILE_NAME);
        match tokio::fs::remove_file(&cache_file).await {
            Ok(()) => {
                info!("Removed station cache {}", cache_file.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AmedasError::CacheDeletion(cache_file, e)),
        }
    }

    /// Downloads the observation tables of a station for an interval.
    ///
    /// The interval is split into one page per day (hourly), per month (daily)
    /// or per year (monthly). Every page that yields a table is written to
    /// `{out_dir}/{station}/{granularity}/{station}_{YYYYMMDD|YYYYMM|YYYY}.csv`;
    /// pages that fail are logged and skipped.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: **Required.** Station name, e.g. `"東京"` or `"高松(香川県)"`.
    /// * `.granularity(Granularity)`: **Required.**
    /// * `.group(&str)`: Optional group (prefecture / region) narrowing the name.
    /// * `.start(impl AnyDate)`: Optional. The first day of the value is used.
    ///   Defaults to the day before `end`.
    /// * `.end(impl AnyDate)`: Optional. The last day of the value is used.
    ///   Defaults to today (UTC).
    /// * `.out_dir(impl Into<PathBuf>)`: Optional. Defaults to `csv`.
    /// * `.combined(bool)`: Also write the concatenated frame to
    ///   `{out_dir}/{station}/{station}_{granularity}_{start}_{end}.csv`.
    ///
    /// # Returns
    ///
    /// All fetched page frames concatenated, columns unioned. The frame is empty
    /// if no page could be fetched.
    ///
    /// # Errors
    ///
    /// * [`AmedasError::LocateStation`] if the name doesn't resolve to exactly one station.
    /// * [`AmedasError::DateParsingError`] if `start` or `end` isn't a date.
    /// * [`AmedasError::InvalidDateRange`] if `start` is after `end`.
    /// * [`AmedasError::WeatherData`] if the frames cannot be concatenated or the
    ///   combined file cannot be written.
    #[builder]
    pub async fn fetch(
        &self,
        station: &str,
        granularity: Granularity,
        group: Option<&str>,
        #[builder(into)] start: Option<DateBound>,
        #[builder(into)] end: Option<DateBound>,
        #[builder(into)] out_dir: Option<PathBuf>,
        #[builder(default)] combined: bool,
    ) -> Result<DataFrame, AmedasError> {
        let resolved = self.station_list.resolve(station, group)?;
        let (start, end) = resolve_interval(start, end, Utc::now().date_naive())?;
        let pages = pages_for_range(granularity, start, end)?;
        info!(
            "Fetching {} {} page(s) for {} ({}) from {} to {}",
            pages.len(),
            granularity,
            resolved.name,
            resolved.group_name,
            start,
            end
        );

        let out_dir = out_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
        let layout = OutputLayout::new(&out_dir, station);
        let frame = self
            .fetcher
            .fetch_pages(&resolved.codes(), &pages, Some(&layout))
            .await?;

        if combined && frame.height() > 0 {
            let path = layout.combined_path(granularity, start, end);
            write_csv(frame.clone(), &path).await?;
            info!("Wrote combined frame ({} rows) to {}", frame.height(), path.display());
        }

        Ok(frame)
    }

    /// Hourly observations, one page per day.
    pub fn hourly(&self) -> HourlyClient<'_> {
        HourlyClient::new(self)
    }

    /// Daily observations, one page per month.
    pub fn daily(&self) -> DailyClient<'_> {
        DailyClient::new(self)
    }

    /// Monthly observations, one page per year.
    pub fn monthly(&self) -> MonthlyClient<'_> {
        MonthlyClient::new(self)
    }
}

fn resolve_interval(
    start: Option<DateBound>,
    end: Option<DateBound>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AmedasError> {
    let start = start
        .map(|bound| bound.first_day().ok_or(AmedasError::DateParsingError))
        .transpose()?;
    let end = end
        .map(|bound| bound.last_day().ok_or(AmedasError::DateParsingError))
        .transpose()?;
    Ok(default_range(start, end, today))
}
