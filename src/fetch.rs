use std::time::Duration;

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::error::{ArchiveError, Result};

/// Async page retrieval: one GET per call, no retries, body always read as UTF-8.
pub struct PageFetcher {
    client: reqwest::Client,
    base: Url,
}

impl PageFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = Url::parse(&settings.base_url)
            .map_err(|e| ArchiveError::Parse(format!("base url {:?}: {}", settings.base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| ArchiveError::Network {
                url: settings.base_url.clone(),
                source,
            })?;

        Ok(Self { client, base })
    }

    /// Resolve an href found on the site against the configured base URL.
    pub fn absolute_url(&self, href: &str) -> Result<Url> {
        self.base
            .join(href)
            .map_err(|e| ArchiveError::Parse(format!("cannot resolve {:?}: {}", href, e)))
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let network = |source: reqwest::Error| ArchiveError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Ignore the declared charset; the site is UTF-8 even when it says otherwise.
        let bytes = response.bytes().await.map_err(network)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetch and parse. The returned tree is not `Send`; keep it out of spawned tasks.
    pub async fn fetch_document(&self, url: &str) -> Result<Html> {
        let body = self.fetch_text(url).await?;
        Ok(Html::parse_document(&body))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fetcher() -> PageFetcher {
        let settings = Settings::with_base_url("https://example.org", PathBuf::from("out"));
        PageFetcher::new(&settings).unwrap()
    }

    #[test]
    fn resolves_relative_hrefs() {
        let url = fetcher().absolute_url("/study/x?lang=eng").unwrap();
        assert_eq!(url.as_str(), "https://example.org/study/x?lang=eng");
    }

    #[test]
    fn keeps_absolute_hrefs() {
        let url = fetcher()
            .absolute_url("https://other.example/general-conference/1971/04?lang=eng")
            .unwrap();
        assert_eq!(url.host_str(), Some("other.example"));
    }

    #[test]
    fn rejects_bad_base_url() {
        let settings = Settings::with_base_url("not a url", PathBuf::from("out"));
        assert!(matches!(PageFetcher::new(&settings), Err(ArchiveError::Parse(_))));
    }
}
