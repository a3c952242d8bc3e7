use crate::weather_data::error::WeatherDataError;
use log::debug;
use reqwest::Client;
use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("amedas-rs/", env!("CARGO_PKG_VERSION"));
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads observation pages from the portal.
#[derive(Debug, Clone)]
pub struct PageLoader {
    download_client: Client,
}

impl PageLoader {
    pub fn new(download_client: Client) -> PageLoader {
        PageLoader { download_client }
    }

    pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, WeatherDataError> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(WeatherDataError::ClientBuild)
    }

    /// Fetches a page and returns its body as text.
    pub async fn download(&self, url: &str) -> Result<String, WeatherDataError> {
        debug!("Downloading page {}", url);

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherDataError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                debug!("HTTP error for {}: {}", url, e);
                return Err(if let Some(status) = e.status() {
                    WeatherDataError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    WeatherDataError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| WeatherDataError::NetworkRequest(url.to_string(), e))?;
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::TestServer;

    #[tokio::test]
    async fn test_download_connection_refused() {
        let client = PageLoader::build_client(DEFAULT_USER_AGENT, Duration::from_secs(2)).unwrap();
        let loader = PageLoader::new(client);
        let result = loader.download("http://127.0.0.1:9/hourly_s1.php").await;
        assert!(matches!(result, Err(WeatherDataError::NetworkRequest(url, _)) if url.ends_with("hourly_s1.php")));
    }

    #[tokio::test]
    async fn test_download_returns_body() {
        let server = TestServer::start(&[("/daily_s1.php?day=", 200, "<table><tr><td>1</td></tr></table>")]).await;
        let loader = PageLoader::new(PageLoader::build_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap());

        let body = loader
            .download(&format!("{}/daily_s1.php?day=", server.base_url))
            .await
            .unwrap();
        assert_eq!(body, "<table><tr><td>1</td></tr></table>");
    }

    #[tokio::test]
    async fn test_download_maps_status_errors() {
        let server = TestServer::start(&[("/busy.php", 503, "busy")]).await;
        let loader = PageLoader::new(PageLoader::build_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap());

        let result = loader.download(&format!("{}/missing.php", server.base_url)).await;
        assert!(matches!(
            result,
            Err(WeatherDataError::HttpStatus { status, ref url, .. })
                if status == reqwest::StatusCode::NOT_FOUND && url.ends_with("/missing.php")
        ));

        let result = loader.download(&format!("{}/busy.php", server.base_url)).await;
        assert!(matches!(
            result,
            Err(WeatherDataError::HttpStatus { status, .. }) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(server.requests(), 2);
    }
}
