use crate::types::page::FetchPage;
use crate::types::station::StationCodes;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::frame_writer::{write_csv, OutputLayout};
use crate::weather_data::page_loader::PageLoader;
use crate::weather_data::table_extractor::page_frame;
use log::{debug, info, warn};
use polars::functions::concat_df_diagonal;
use polars::prelude::DataFrame;

/// Fetches observation pages one after the other and stitches their tables
/// together.
pub struct FrameFetcher {
    loader: PageLoader,
    base_url: String,
}

impl FrameFetcher {
    pub fn new(loader: PageLoader, base_url: &str) -> Self {
        Self {
            loader,
            base_url: base_url.to_string(),
        }
    }

    /// Downloads a single page and extracts its table.
    ///
    /// Returns `Ok(None)` when the page table has no data rows.
    pub async fn fetch_page(
        &self,
        codes: &StationCodes,
        page: &FetchPage,
    ) -> Result<Option<DataFrame>, WeatherDataError> {
        let url = page.url(&self.base_url, codes);
        let html = self.loader.download(&url).await?;
        let page_owned = *page;
        tokio::task::spawn_blocking(move || page_frame(&html, &page_owned)).await?
    }

    /// Fetches every page in order. A page that cannot be fetched or parsed is
    /// logged and skipped. When a layout is given, each page frame is also
    /// written to its own CSV file.
    ///
    /// Returns the diagonal concatenation of all page frames, or an empty frame
    /// if no page yielded data.
    pub async fn fetch_pages(
        &self,
        codes: &StationCodes,
        pages: &[FetchPage],
        layout: Option<&OutputLayout>,
    ) -> Result<DataFrame, WeatherDataError> {
        let mut frames = Vec::with_capacity(pages.len());

        for page in pages {
            let df = match self.fetch_page(codes, page).await {
                Ok(Some(df)) => df,
                Ok(None) => {
                    debug!("No rows on page {}, skipping", page);
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Failed to fetch {}: {}",
                        page.url(&self.base_url, codes),
                        error_chain(&e)
                    );
                    continue;
                }
            };

            if let Some(layout) = layout {
                let path = layout.page_path(page);
                match write_csv(df.clone(), &path).await {
                    Ok(()) => info!("Wrote {} rows to {}", df.height(), path.display()),
                    Err(e) => warn!("Failed to write {}: {}", path.display(), error_chain(&e)),
                }
            }

            frames.push(df);
        }

        info!("Fetched {} of {} pages", frames.len(), pages.len());

        if frames.is_empty() {
            return Ok(DataFrame::empty());
        }
        concat_df_diagonal(&frames).map_err(WeatherDataError::Concat)
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::TestServer;
    use crate::weather_data::page_loader::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn fetcher() -> FrameFetcher {
        let client = PageLoader::build_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        // Nothing listens on the discard port, so every request fails fast.
        FrameFetcher::new(PageLoader::new(client), "http://127.0.0.1:9/etrn/view")
    }

    #[tokio::test]
    async fn test_failing_pages_are_skipped() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path(), "東京");
        let codes = StationCodes::new(44, "47662");
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let pages: Vec<FetchPage> = start
            .iter_days()
            .take(3)
            .map(FetchPage::hourly)
            .collect();

        let df = fetcher()
            .fetch_pages(&codes, &pages, Some(&layout))
            .await
            .unwrap();

        assert_eq!(df.height(), 0);
        assert!(!layout.station_dir().exists());
    }

    const JANUARY: &str = "<table><tr><th>日</th><th>気温</th></tr>\
        <tr><td>1</td><td>5.1</td></tr><tr><td>2</td><td>4.8</td></tr></table>";
    const FEBRUARY: &str = "<table><tr><th>日</th><th>湿度</th></tr><tr><td>1</td><td>40</td></tr></table>";

    #[tokio::test]
    async fn test_fetched_pages_are_written_and_combined() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path(), "高松");
        let codes = StationCodes::new(72, "47891");
        let pages = [
            FetchPage::daily(2023, 1),
            FetchPage::daily(2023, 2),
            FetchPage::daily(2023, 3),
        ];
        let january_target = pages[0].url("/etrn/view", &codes);
        let february_target = pages[1].url("/etrn/view", &codes);
        // March is not served and answers 404.
        let server = TestServer::start(&[
            (january_target.as_str(), 200, JANUARY),
            (february_target.as_str(), 200, FEBRUARY),
        ])
        .await;
        let client = PageLoader::build_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        let fetcher = FrameFetcher::new(PageLoader::new(client), &format!("{}/etrn/view", server.base_url));

        let df = fetcher
            .fetch_pages(&codes, &pages, Some(&layout))
            .await
            .unwrap();

        assert_eq!(server.requests(), 3);
        assert_eq!(df.shape(), (3, 4));
        assert_eq!(df.get_column_names(), ["month", "日", "気温", "湿度"]);
        let months: Vec<_> = df.column("month").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(months, [Some("2023-01"), Some("2023-01"), Some("2023-02")]);
        assert_eq!(df.column("気温").unwrap().null_count(), 1);
        assert_eq!(df.column("湿度").unwrap().null_count(), 2);

        let january = std::fs::read_to_string(layout.page_path(&pages[0])).unwrap();
        assert_eq!(january, "month,日,気温\n2023-01,1,5.1\n2023-01,2,4.8\n");
        let february = std::fs::read_to_string(layout.page_path(&pages[1])).unwrap();
        assert_eq!(february, "month,日,湿度\n2023-02,1,40\n");
        assert!(!layout.page_path(&pages[2]).exists());
    }

    #[tokio::test]
    async fn test_fetch_page_reports_http_status() {
        let server = TestServer::start(&[]).await;
        let client = PageLoader::build_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        let fetcher = FrameFetcher::new(PageLoader::new(client), &server.base_url);

        let result = fetcher
            .fetch_page(&StationCodes::new(44, "47662"), &FetchPage::monthly(2023))
            .await;
        assert!(matches!(
            result,
            Err(WeatherDataError::HttpStatus { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_reports_network_error() {
        let codes = StationCodes::new(44, "47662");
        let result = fetcher()
            .fetch_page(&codes, &FetchPage::monthly(2023))
            .await;
        assert!(matches!(result, Err(WeatherDataError::NetworkRequest(..))));
    }

    #[test]
    fn test_diagonal_concat_unions_columns() {
        use polars::prelude::*;

        let a = df!("date" => ["2023-01-01"], "気温" => ["5.1"]).unwrap();
        let b = df!("date" => ["2023-01-02"], "湿度" => ["40"]).unwrap();
        let combined = concat_df_diagonal(&[a, b]).unwrap();

        assert_eq!(combined.shape(), (2, 3));
        assert_eq!(combined.column("気温").unwrap().null_count(), 1);
    }

    #[test]
    fn test_error_chain() {
        let err = WeatherDataError::CsvWriteIo(
            "out.csv".into(),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(error_chain(&err), "I/O error writing CSV file 'out.csv': denied");
    }
}
