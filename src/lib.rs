mod amedas;
mod clients;
mod error;
mod stations;
mod types;
mod utils;
mod weather_data;

#[cfg(test)]
mod test_server;

pub use amedas::*;
pub use error::AmedasError;

pub use clients::daily_client::*;
pub use clients::hourly_client::*;
pub use clients::monthly_client::*;

pub use types::granularity::{Granularity, ParseGranularityError, StationKind};
pub use types::page::{pages_for_range, FetchPage, DEFAULT_BASE_URL};
pub use types::station::*;

pub use types::traits::any::any_date::{AnyDate, DateBound};
pub use types::traits::types::Month;
pub use types::traits::types::StartEndDate;
pub use types::traits::types::Year;

pub use stations::error::LocateStationError;
pub use stations::station_list::{StationList, STATION_LIST_URL};

pub use weather_data::error::WeatherDataError;
pub use weather_data::table_extractor::{extract_first_table, RawTable};
