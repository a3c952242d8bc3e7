//! Defines the data structures representing JMA observation stations as listed
//! in the AMeDAS station table.

use crate::types::granularity::StationKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a single row of the AMeDAS station table.
///
/// Only `prec_no` and `block_no` are needed to address the observation pages,
/// the remaining fields are kept for display and disambiguation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// Prefecture (or subprefecture) number used by the portal, e.g. `44` for Tokyo.
    pub prec_no: u32,
    /// Block number, zero padded to at least four digits, e.g. `"47662"` or `"0363"`.
    pub block_no: String,
    /// Station name as written in the table, e.g. `"東京"`.
    pub name: String,
    /// Name of the group (prefecture / region) the station belongs to.
    pub group_name: String,
    /// Latitude in decimal degrees, if available.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if available.
    pub longitude: Option<f64>,
    /// Elevation above sea level in meters, if available.
    pub height: Option<f64>,
    /// National station identifier, if available.
    pub station_id: Option<String>,
    pub area_code: Option<String>,
    pub group_code: Option<String>,
}

impl Station {
    /// The pair of identifiers needed to build observation page URLs.
    pub fn codes(&self) -> StationCodes {
        StationCodes {
            prec_no: self.prec_no,
            block_no: self.block_no.clone(),
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) prec_no={} block_no={}",
            self.name, self.group_name, self.prec_no, self.block_no
        )
    }
}

/// The numeric identifiers a station is addressed by on the `etrn` portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationCodes {
    pub prec_no: u32,
    pub block_no: String,
}

impl StationCodes {
    pub fn new(prec_no: u32, block_no: impl Into<String>) -> Self {
        Self {
            prec_no,
            block_no: pad_block_no(&block_no.into()),
        }
    }

    pub fn kind(&self) -> StationKind {
        StationKind::from_block_no(&self.block_no)
    }
}

/// Left-pads a block number with zeros to four digits.
pub(crate) fn pad_block_no(raw: &str) -> String {
    format!("{:0>4}", raw.trim())
}
