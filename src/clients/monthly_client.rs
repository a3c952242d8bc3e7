//! Provides the `MonthlyClient`; monthly aggregates come as one page per year.

use crate::types::traits::any::any_date::DateBound;
use crate::{Amedas, AmedasError, Granularity};
use bon::bon;
use polars::prelude::DataFrame;
use std::path::PathBuf;

/// A client builder specifically for fetching monthly observations.
///
/// Instances are created by calling [`Amedas::monthly()`].
pub struct MonthlyClient<'a> {
    client: &'a Amedas,
}

#[bon]
impl<'a> MonthlyClient<'a> {
    pub(crate) fn new(client: &'a Amedas) -> Self {
        Self { client }
    }

    /// Starts a request for the monthly observations of a station.
    ///
    /// ```no_run
    /// # use amedas::{Amedas, AmedasError, Year};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), AmedasError> {
    /// let client = Amedas::new().await?;
    /// let frame = client
    ///     .monthly()
    ///     .station("東京")
    ///     .start(Year(2000))
    ///     .end(Year(2023))
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
            .granularity(Granularity::Monthly)
            .maybe_group(group)
            .maybe_start(start)
            .maybe_end(end)
            .maybe_out_dir(out_dir)
            .combined(combined)
            .call()
            .await
    }
}
