// * Robots policy, Crawl-delay and request pacing
// * The policy is fetched once per crawl; a missing or unreachable robots.txt
// * allows everything.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use robotstxt::DefaultMatcher;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::network::PageClient;

/// Parsed robots.txt for one site and one agent token
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    body: Option<String>,
    agent: String,
    crawl_delay: Option<Duration>,
}

impl RobotsPolicy {
    /// Policy that allows every URL
    pub fn allow_all(agent: &str) -> Self {
        Self {
            body: None,
            agent: agent.to_string(),
            crawl_delay: None,
        }
    }

    pub fn parse(body: &str, agent: &str) -> Self {
        Self {
            crawl_delay: extract_crawl_delay(body, agent),
            body: Some(body.to_string()),
            agent: agent.to_string(),
        }
    }

    /// Fetches `/robots.txt` from the origin of `site`
    pub async fn fetch(client: &PageClient, site: &Url, agent: &str) -> Self {
        let robots_url = match site.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return Self::allow_all(agent),
        };

        match client.fetch_text(robots_url.as_str()).await {
            Ok(body) => {
                let policy = Self::parse(&body, agent);
                info!(url = %robots_url, crawl_delay = ?policy.crawl_delay, "Loaded robots policy");
                policy
            }
            Err(e) => {
                debug!(url = %robots_url, error = %e, "No robots policy, allowing all");
                Self::allow_all(agent)
            }
        }
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.body {
            Some(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, &self.agent, url)
            }
            None => true,
        }
    }

    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }
}

// * Crawl-delay for the agent's own group, falling back to the `*` group.
// * The robotstxt crate only covers Allow/Disallow, so this is a line scan.
fn extract_crawl_delay(robots_txt: &str, agent: &str) -> Option<Duration> {
    let agent = agent.to_lowercase();
    let mut in_specific = false;
    let mut in_wildcard = false;
    let mut last_was_agent = false;
    let mut specific = None;
    let mut wildcard = None;

    for line in robots_txt.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        if key == "user-agent" {
            // * Consecutive User-agent lines share one group
            if !last_was_agent {
                in_specific = false;
                in_wildcard = false;
            }
            let name = value.to_lowercase();
            if name == "*" {
                in_wildcard = true;
            } else if !name.is_empty() && agent.contains(&name) {
                in_specific = true;
            }
            last_was_agent = true;
            continue;
        }
        last_was_agent = false;

        if key == "crawl-delay" {
            let Ok(secs) = value.parse::<f64>() else {
                continue;
            };
            if secs <= 0.0 {
                continue;
            }
            // * NaN, infinite and out-of-range values are ignored
            let Ok(delay) = Duration::try_from_secs_f64(secs) else {
                continue;
            };
            if in_specific {
                specific = Some(delay);
            } else if in_wildcard {
                wildcard = Some(delay);
            }
        }
    }

    specific.or(wildcard)
}

/// Request pacing shared by every fetch worker of a crawl:
/// a fixed per-request sleep plus, when the site asks for a longer
/// Crawl-delay, a governor limiter spacing requests across all workers.
pub struct Politeness {
    delay: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Politeness {
    pub fn new(delay: Duration, crawl_delay: Option<Duration>) -> Self {
        let limiter = crawl_delay
            .filter(|d| *d > delay)
            .and_then(Quota::with_period)
            .map(RateLimiter::direct);

        Self { delay, limiter }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Waits until the next request may be sent
    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
