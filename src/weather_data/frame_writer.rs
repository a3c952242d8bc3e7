use crate::types::granularity::Granularity;
use crate::types::page::FetchPage;
use crate::weather_data::error::WeatherDataError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

/// Lays out where fetched frames are stored below an output directory.
///
/// ```text
/// {out_dir}/{station}/{granularity}/{station}_{YYYYMMDD|YYYYMM|YYYY}.csv
/// {out_dir}/{station}/{station}_{granularity}_{start}_{end}.csv
/// ```
#[derive(Debug, Clone)]
pub struct OutputLayout {
    out_dir: PathBuf,
    station: String,
}

impl OutputLayout {
    pub fn new(out_dir: &Path, station: &str) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            station: sanitize(station),
        }
    }

    pub fn station_dir(&self) -> PathBuf {
        self.out_dir.join(&self.station)
    }

    pub fn page_path(&self, page: &FetchPage) -> PathBuf {
        self.station_dir()
            .join(page.granularity.to_string())
            .join(format!("{}_{}.csv", self.station, page.file_stem()))
    }

    pub fn combined_path(&self, granularity: Granularity, start: NaiveDate, end: NaiveDate) -> PathBuf {
        self.station_dir().join(format!(
            "{}_{}_{}_{}.csv",
            self.station,
            granularity,
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        ))
    }
}

// Path separators in a station name would escape the station directory.
fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// Writes a DataFrame as CSV (with header) using spawn_blocking, creating
/// parent directories as needed.
pub async fn write_csv(mut df: DataFrame, path: &Path) -> Result<(), WeatherDataError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| WeatherDataError::OutputDirCreation(parent.to_path_buf(), e))?;
    }

    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || {
        let mut file = std::fs::File::create(&path_buf)
            .map_err(|e| WeatherDataError::CsvWriteIo(path_buf.clone(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| WeatherDataError::CsvWritePolars(path_buf, e))?;
        Ok::<(), WeatherDataError>(())
    })
    .await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new(Path::new("csv"), "東京");
        assert_eq!(
            layout.page_path(&FetchPage::hourly(ymd(2023, 1, 5))),
            Path::new("csv/東京/hourly/東京_20230105.csv")
        );
        assert_eq!(
            layout.page_path(&FetchPage::daily(2023, 1)),
            Path::new("csv/東京/daily/東京_202301.csv")
        );
        assert_eq!(
            layout.page_path(&FetchPage::monthly(2023)),
            Path::new("csv/東京/monthly/東京_2023.csv")
        );
        assert_eq!(
            layout.combined_path(Granularity::Hourly, ymd(2023, 1, 1), ymd(2023, 1, 31)),
            Path::new("csv/東京/東京_hourly_20230101_20230131.csv")
        );
    }

    #[test]
    fn test_station_name_is_sanitized() {
        let layout = OutputLayout::new(Path::new("out"), "a/b");
        assert_eq!(layout.station_dir(), Path::new("out/a_b"));
    }

    #[tokio::test]
    async fn test_write_csv_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("東京").join("daily").join("東京_202301.csv");
        let df = df!(
            "month" => ["2023-01", "2023-01"],
            "日" => [Some("1"), None],
            "降水量" => ["0.5", "--"],
        )
        .unwrap();

        write_csv(df, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "month,日,降水量\n2023-01,1,0.5\n2023-01,,--\n");
    }
}
