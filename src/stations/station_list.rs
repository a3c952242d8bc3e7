use crate::stations::error::LocateStationError;
use crate::types::station::{pad_block_no, Station};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

pub const STATION_LIST_URL: &str =
    "https://raw.githubusercontent.com/KatsuhiroMorishita/AMeDAS_downloader/master/AMeDAS_list.csv";
pub(crate) const BINCODE_CACHE_FILE_NAME: &str = "amedas_stations.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

const STATION_COLUMNS: [&str; 10] = [
    "prec_no",
    "block_no",
    "name",
    "group_name",
    "degree_lat",
    "degree_lon",
    "height",
    "station_id",
    "area_code",
    "group_code",
];

/// On-disk form of the station table, remembering where it was downloaded from.
#[derive(Debug, Serialize, Deserialize)]
struct StationCache {
    source_url: String,
    stations: Vec<Station>,
}

#[derive(Debug, Clone)]
pub struct StationList {
    stations: Vec<Station>,
}

impl StationList {
    pub fn from_stations(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Loads the station table, preferring an explicit local file, then the
    /// on-disk cache and finally the remote table (which is cached afterwards).
    pub async fn load(
        client: &Client,
        cache_dir: &Path,
        url: &str,
        local_file: Option<&Path>,
    ) -> Result<Self, LocateStationError> {
        if let Some(path) = local_file {
            info!("Reading station list from {}", path.display());
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| LocateStationError::StationListRead(path.to_path_buf(), e))?;
            let stations = tokio::task::spawn_blocking(move || Self::parse(bytes)).await??;
            return Ok(Self::from_stations(stations));
        }

        let cache_file = cache_dir.join(BINCODE_CACHE_FILE_NAME);
        if cache_file.exists() {
            let path_clone = cache_file.clone();
            match tokio::task::spawn_blocking(move || Self::get_cached_stations(&path_clone)).await? {
                Ok(cache) if cache.source_url == url => {
                    return Ok(Self::from_stations(cache.stations));
                }
                Ok(cache) => info!(
                    "Station cache was built from {}, refetching from {}",
                    cache.source_url, url
                ),
                Err(e) => warn!("Ignoring unreadable station cache: {}", e),
            }
        } else {
            info!("Station cache not found. Fetching from URL: {}", url);
        }

        let stations = Self::fetch_stations(client, url).await?;
        let cache = StationCache {
            source_url: url.to_string(),
            stations,
        };
        Self::cache_stations(&cache, &cache_file).await?;
        Ok(Self::from_stations(cache.stations))
    }

    fn get_cached_stations(cache_path: &Path) -> Result<StationCache, LocateStationError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| LocateStationError::CacheRead(cache_path.to_path_buf(), e))?;
        let (cache, _) =
            bincode::serde::decode_from_slice::<StationCache, _>(&bytes, BINCODE_CONFIG).map_err(
                |e| LocateStationError::CacheDecode(cache_path.to_path_buf(), Box::from(e)),
            )?;
        info!(
            "Loaded {} stations from cache {}",
            cache.stations.len(),
            cache_path.display()
        );
        Ok(cache)
    }

    async fn fetch_stations(client: &Client, url: &str) -> Result<Vec<Station>, LocateStationError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(url.to_string(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                if let Some(status) = e.status() {
                    return Err(LocateStationError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    });
                } else {
                    return Err(LocateStationError::NetworkRequest(url.to_string(), e));
                }
            }
        };
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(url.to_string(), e))?
            .to_vec();

        let parse_start = std::time::Instant::now();
        let stations = tokio::task::spawn_blocking(move || Self::parse(bytes)).await??;
        info!(
            "Parsed {} stations from station list in {:?}",
            stations.len(),
            parse_start.elapsed()
        );
        Ok(stations)
    }

    async fn cache_stations(cache: &StationCache, cache_path: &Path) -> Result<(), LocateStationError> {
        let bincode_data = bincode::serde::encode_to_vec(cache, BINCODE_CONFIG)
            .map_err(|e| LocateStationError::CacheEncode(Box::new(e)))?;
        tokio::fs::write(&cache_path, &bincode_data)
            .await
            .map_err(|e| LocateStationError::CacheWrite(cache_path.to_path_buf(), e))?;
        info!(
            "Wrote station cache ({} bytes) to {}",
            bincode_data.len(),
            cache_path.display()
        );
        Ok(())
    }

    /// Parses the tab separated station table (no header row).
    ///
    /// Every column is read as a string and missing trailing fields are null.
    /// Rows without a name or with a non-numeric `prec_no` are skipped.
    pub(crate) fn parse(bytes: Vec<u8>) -> Result<Vec<Station>, LocateStationError> {
        let schema = Schema::from_iter(
            STATION_COLUMNS
                .iter()
                .map(|name| Field::new((*name).into(), DataType::String)),
        );
        // Fields are never quoted; short rows are padded with nulls.
        let df = CsvReadOptions::default()
            .with_has_header(false)
            .with_schema(Some(Arc::new(schema)))
            .map_parse_options(|opts| {
                opts.with_separator(b'\t')
                    .with_quote_char(None)
                    .with_truncate_ragged_lines(true)
            })
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(LocateStationError::StationListParse)?;

        let columns = STATION_COLUMNS
            .iter()
            .map(|name| string_column(&df, name))
            .collect::<Result<Vec<_>, _>>()?;
        let cell = |col: usize, row: usize| columns[col][row].map(str::trim).filter(|v| !v.is_empty());

        let mut stations = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let Some(name) = cell(2, row) else {
                warn!("Skipping station row {} without a name", row);
                continue;
            };
            let Some(prec_no) = cell(0, row).and_then(|v| v.parse::<u32>().ok()) else {
                warn!("Skipping station '{}': invalid prec_no {:?}", name, cell(0, row));
                continue;
            };
            let Some(block_no) = cell(1, row) else {
                warn!("Skipping station '{}': missing block_no", name);
                continue;
            };

            stations.push(Station {
                prec_no,
                block_no: pad_block_no(block_no),
                name: name.to_string(),
                group_name: cell(3, row).unwrap_or_default().to_string(),
                latitude: cell(4, row).and_then(|v| v.parse().ok()),
                longitude: cell(5, row).and_then(|v| v.parse().ok()),
                height: cell(6, row).and_then(|v| v.parse().ok()),
                station_id: cell(7, row).map(str::to_string),
                area_code: cell(8, row).map(str::to_string),
                group_code: cell(9, row).map(str::to_string),
            });
        }

        if stations.is_empty() {
            return Err(LocateStationError::EmptyStationList);
        }
        Ok(stations)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations whose name contains `fragment`.
    pub fn search(&self, fragment: &str) -> Vec<&Station> {
        let fragment = fragment.trim();
        self.stations
            .iter()
            .filter(|s| s.name.contains(fragment))
            .collect()
    }

    /// Resolves a station name, optionally narrowed down by group, to exactly one station.
    ///
    /// A name written as `NAME(GROUP)` that is not itself in the table is retried
    /// as `NAME` within `GROUP`.
    pub fn resolve(&self, name: &str, group: Option<&str>) -> Result<&Station, LocateStationError> {
        let name = name.trim();
        let group = group.map(str::trim).filter(|g| !g.is_empty());

        let candidates = self.candidates(name, group);
        match candidates.as_slice() {
            [station] => Ok(station),
            [] => {
                if let Some((base, suffix)) = split_qualified_name(name) {
                    let retry = self.candidates(base, group.or(Some(suffix)));
                    match retry.as_slice() {
                        [station] => return Ok(station),
                        [] => {}
                        many => return Err(ambiguous(name, many)),
                    }
                }
                Err(LocateStationError::UnknownStation {
                    name: name.to_string(),
                    group: group.map(str::to_string),
                })
            }
            many => Err(ambiguous(name, many)),
        }
    }

    fn candidates(&self, name: &str, group: Option<&str>) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|s| s.name == name)
            .filter(|s| group.map_or(true, |g| s.group_name == g || s.group_name.contains(g)))
            .collect()
    }
}

fn ambiguous(name: &str, candidates: &[&Station]) -> LocateStationError {
    LocateStationError::AmbiguousStation {
        name: name.to_string(),
        groups: candidates
            .iter()
            .map(|s| format!("{} [{}]", s.group_name, s.block_no))
            .collect(),
    }
}

fn string_column<'a>(
    df: &'a DataFrame,
    name: &str,
) -> Result<Vec<Option<&'a str>>, LocateStationError> {
    let ca = df
        .column(name)
        .and_then(|c| c.str())
        .map_err(LocateStationError::StationListParse)?;
    Ok(ca.into_iter().collect())
}

/// Splits `高松(香川県)` into `("高松", "香川県")`. Full-width parentheses are accepted too.
fn split_qualified_name(name: &str) -> Option<(&str, &str)> {
    let trimmed = name.trim_end();
    let (open, close) = if trimmed.ends_with(')') {
        ('(', ')')
    } else if trimmed.ends_with('）') {
        ('（', '）')
    } else {
        return None;
    };
    let inner_end = trimmed.len() - close.len_utf8();
    let open_idx = trimmed[..inner_end].rfind(open)?;
    let base = trimmed[..open_idx].trim();
    let group = trimmed[open_idx + open.len_utf8()..inner_end].trim();
    if base.is_empty() || group.is_empty() {
        return None;
    }
    Some((base, group))
}
