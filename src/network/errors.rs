use thiserror::Error;

// * Unified error type for page fetching.
// * Every variant is recoverable: the affected page/document is downgraded to
// * an error status and processing continues.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Not an HTML response (content-type: {0})")]
    NotHtml(String),

    #[error("Redirected off the crawled site to {0}")]
    OffDomain(String),

    #[error("No extractable content at {0}")]
    NoContent(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch worker failed: {0}")]
    Worker(String),
}

impl FetchError {
    /// Short outcome label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Request(e) if e.is_timeout() => "timeout",
            FetchError::Request(_) => "request",
            FetchError::Status(_) => "status",
            FetchError::NotHtml(_) => "not_html",
            FetchError::OffDomain(_) => "off_domain",
            FetchError::NoContent(_) => "no_content",
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::Worker(_) => "worker",
        }
    }
}
