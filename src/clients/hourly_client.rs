//! Provides the `HourlyClient` for hour-by-hour observations.
//!
//! The portal serves hourly observations as one page per day, so a request
//! covering `n` days downloads `n` pages.

use crate::types::traits::any::any_date::DateBound;
use crate::{Amedas, AmedasError, Granularity};
use bon::bon;
use polars::prelude::DataFrame;
use std::path::PathBuf;

/// A client builder specifically for fetching hourly observations.
///
/// Instances are created by calling [`Amedas::hourly()`].
pub struct HourlyClient<'a> {
    client: &'a Amedas,
}

#[bon]
impl<'a> HourlyClient<'a> {
    pub(crate) fn new(client: &'a Amedas) -> Self {
        Self { client }
    }

    /// Starts a request for the hourly observations of a station.
    ///
    /// # Optional Builder Methods
    ///
    /// * `.group(&str)`: group (prefecture / region) narrowing the station name.
    /// * `.start(impl AnyDate)` / `.end(impl AnyDate)`: the interval, defaulting
    ///   to yesterday and today.
    /// * `.out_dir(impl Into<PathBuf>)`: defaults to `csv`.
    /// * `.combined(bool)`: also write the concatenated frame to one file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use amedas::{Amedas, AmedasError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), AmedasError> {
    /// let client = Amedas::new().await?;
    /// let frame = client
    ///     .hourly()
    ///     .station("札幌")
    ///     .start("2023-07-01")
    ///     .end("2023-07-03")
    ///     .call()
    ///     .await?;
    /// // One `date` key column plus the table columns.
    /// println!("{}", frame.head(Some(24)));
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
        group: Option<&str>,
        #[builder(into)] start: Option<DateBound>,
        #[builder(into)] end: Option<DateBound>,
        #[builder(into)] out_dir: Option<PathBuf>,
        #[builder(default)] combined: bool,
    ) -> Result<DataFrame, AmedasError> {
        self.client
            .fetch()
            .station(station)
            .granularity(Granularity::Hourly)
            .maybe_group(group)
            .maybe_start(start)
            .maybe_end(end)
            .maybe_out_dir(out_dir)
            .combined(combined)
            .call()
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::amedas::tests::offline_client;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_hourly_station_offline() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir).await;

        let frame = client
            .hourly()
            .station("札幌")
            .start("2023-07-01")
            .end("2023-07-02")
            .out_dir(dir.path().join("csv"))
            .call()
            .await
            .unwrap();
        assert_eq!(frame.height(), 0);
    }
}
