pub mod constants;
pub mod settings;

pub use settings::{CompareConfig, ConfigError, CrawlConfig, MatchConfig, Settings};
