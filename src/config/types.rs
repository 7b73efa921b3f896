use serde::Deserialize;

/// Default redirect hop budget per URL
pub const DEFAULT_MAX_REDIRECT: u32 = 10;

/// Default number of concurrent workers
pub const DEFAULT_MAX_TASKS: u32 = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for Trailmap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
///
/// Immutable for the lifetime of a crawl; workers only ever read it.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root URL to start crawling from; the crawl is restricted to its host
    pub target: String,

    /// Maximum redirect hops per URL (zero means redirects always fail)
    #[serde(rename = "max-redirect", default = "default_max_redirect")]
    pub max_redirect: u32,

    /// Number of concurrent worker tasks
    #[serde(rename = "max-tasks", default = "default_max_tasks")]
    pub max_tasks: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path for the sitemap text file; a timestamped name is generated when
    /// absent
    #[serde(rename = "sitemap-path")]
    pub sitemap_path: Option<String>,
}

fn default_max_redirect() -> u32 {
    DEFAULT_MAX_REDIRECT
}

fn default_max_tasks() -> u32 {
    DEFAULT_MAX_TASKS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_crawler_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

impl Config {
    /// Builds a configuration for the given target with all defaults
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                target: target.into(),
                max_redirect: DEFAULT_MAX_REDIRECT,
                max_tasks: DEFAULT_MAX_TASKS,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}
