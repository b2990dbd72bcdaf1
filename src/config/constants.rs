// * Configuration Constants
// * Central location for all comparison, crawl and matching policy values

// * Minimum block similarity for a primary match
pub const ALIGN_THRESHOLD: f64 = 0.9;

// * Minimum sentence similarity for a partial match (strictly greater than)
pub const SENTENCE_THRESHOLD: f64 = 0.8;

// * Weight of the matched-length ratio in the aggregate similarity
pub const CONTENT_WEIGHT: f64 = 0.7;

// * Weight of the matched-block ratio in the aggregate similarity
pub const BLOCK_WEIGHT: f64 = 0.3;

// * Default page cap for a crawl
pub const MAX_PAGES: usize = 100;

// * URLs drawn from the frontier per batch
pub const CRAWL_BATCH_SIZE: usize = 5;

// * Fetch workers per batch
pub const CRAWL_WORKERS: usize = 5;

// * Fixed delay before every request, in milliseconds
pub const REQUEST_DELAY_MS: u64 = 500;

// * Page fetch timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// * Maximum redirects followed per request
pub const MAX_REDIRECTS: usize = 10;

// * HTTP User-Agent header
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; VerbatimBot/0.1; +https://example.invalid/bot)";

// * Product token matched against robots.txt groups
pub const ROBOTS_AGENT: &str = "VerbatimBot";

// * URL similarity above which the URL dominates the combined score
pub const URL_CONFIDENCE: f64 = 0.8;

// * Combined score above which the top candidate is accepted without asking
pub const AUTO_ACCEPT_SCORE: f64 = 0.3;

// * Candidates presented for manual resolution
pub const MANUAL_CANDIDATES: usize = 5;

// * Weight of the dominant signal in the combined match score
pub const MATCH_PRIMARY_WEIGHT: f64 = 0.7;

// * Weight of the secondary signal in the combined match score
pub const MATCH_SECONDARY_WEIGHT: f64 = 0.3;
