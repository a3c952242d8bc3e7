//! Provides the `DailyClient` for daily aggregated observations, served as one
//! page per calendar month.

use crate::types::traits::any::any_date::DateBound;
use crate::{Amedas, AmedasError, Granularity};
use bon::bon;
use polars::prelude::DataFrame;
use std::path::PathBuf;

/// A client builder specifically for fetching daily observations.
///
/// Instances are created by calling [`Amedas::daily()`]. A request touching any
/// day of a month downloads the whole month.
pub struct DailyClient<'a> {
    client: &'a Amedas,
}

#[bon]
impl<'a> DailyClient<'a> {
    pub(crate) fn new(client: &'a Amedas) -> Self {
        Self { client }
    }

    /// Starts a request for the daily observations of a station.
    ///
    /// Takes the same optional builder methods as [`Amedas::fetch()`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use amedas::{Amedas, AmedasError, Month};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), AmedasError> {
    /// let client = Amedas::new().await?;
    /// let frame = client
    ///     .daily()
    ///     .station("高松")
    ///     .group("香川県")
    ///     .start(Month(2023, 1))
    ///     .end(Month(2023, 3))
    ///     .combined(true)
    ///     .call()
    ///     .await?;
    /// println!("{}", frame);
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
            .granularity(Granularity::Daily)
            .maybe_group(group)
            .maybe_start(start)
            .maybe_end(end)
            .maybe_out_dir(out_dir)
            .combined(combined)
            .call()
            .await
    }
}
