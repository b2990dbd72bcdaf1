use crate::config::CrawlConfig;
use crate::network::errors::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, Response};
use tracing::{debug, warn};
use url::Url;

/// A successfully fetched HTML document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    pub html: String,
}

// * HTML-only HTTP client.
// * Redirects are followed up to the configured limit; the caller decides what
// * to do with a final URL that left the site.
pub struct PageClient {
    inner: Client,
    // * Only built when certificate fallback is enabled
    insecure: Option<Client>,
}

impl PageClient {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let inner = Self::builder(config).build()?;
        let insecure = if config.accept_invalid_certs_fallback {
            Some(
                Self::builder(config)
                    .danger_accept_invalid_certs(true)
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self { inner, insecure })
    }

    fn builder(config: &CrawlConfig) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
    }

    // * Fetches a URL and accepts only successful text/html responses.
    pub async fn fetch_html(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let resp = self.send(&parsed).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(FetchError::NotHtml(content_type));
        }

        let final_url = resp.url().to_string();
        let html = resp.text().await?;
        debug!(url = %url, final_url = %final_url, bytes = html.len(), "Fetched page");

        Ok(FetchedPage { final_url, html })
    }

    // * Fetches any successful text body (robots.txt and similar).
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let resp = self.send(&parsed).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }

    async fn send(&self, url: &Url) -> Result<Response, FetchError> {
        match self.inner.get(url.clone()).send().await {
            Ok(resp) => Ok(resp),
            Err(e) if e.is_connect() && url.scheme() == "https" => match &self.insecure {
                Some(insecure) => {
                    // ! Certificate verification disabled for this retry
                    warn!(url = %url, error = %e, "HTTPS connect failed, retrying without certificate verification");
                    Ok(insecure.get(url.clone()).send().await?)
                }
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialization() {
        assert!(PageClient::new(&CrawlConfig::default()).is_ok());

        let config = CrawlConfig {
            accept_invalid_certs_fallback: true,
            ..CrawlConfig::default()
        };
        let client = PageClient::new(&config).unwrap();
        assert!(client.insecure.is_some());
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let client = PageClient::new(&CrawlConfig::default()).unwrap();
        assert!(matches!(
            client.fetch_html("ftp://example.com/file").await,
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            client.fetch_html("not a url").await,
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
