// Runtime configuration.
// Defaults for the data client, overridable from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ShowcaseError};
use crate::github::endpoints::MAX_PER_PAGE;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Cached responses are fresh for 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by the HTTP transport and the data client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Profile owner shown by the site.
    pub username: Option<String>,
    pub api_base: String,
    /// How long a cached response is served without a network call.
    pub ttl: Duration,
    pub per_page: u8,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Optional token; raises the API rate limit.
    pub token: Option<String>,
    pub user_agent: String,
    /// Persist successful payloads to disk between runs.
    pub persist: bool,
    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            api_base: DEFAULT_API_BASE.to_string(),
            ttl: DEFAULT_TTL,
            per_page: MAX_PER_PAGE,
            timeout: DEFAULT_TIMEOUT,
            token: None,
            user_agent: "showcase".to_string(),
            persist: true,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        config.username = var("SHOWCASE_USERNAME").or_else(|| var("GITHUB_USERNAME"));
        config.token = var("GITHUB_TOKEN");

        if let Some(base) = var("SHOWCASE_API_BASE") {
            config.api_base = base;
        }
        if let Some(secs) = var("SHOWCASE_TTL_SECS") {
            config.ttl = Duration::from_secs(parse_number("SHOWCASE_TTL_SECS", &secs)?);
        }
        if let Some(secs) = var("SHOWCASE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("SHOWCASE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(per_page) = var("SHOWCASE_PER_PAGE") {
            let n = parse_number("SHOWCASE_PER_PAGE", &per_page)?;
            config.per_page = n.clamp(1, MAX_PER_PAGE as u64) as u8;
        }
        if var("SHOWCASE_NO_PERSIST").is_some() {
            config.persist = false;
        }
        config.cache_dir = var("SHOWCASE_CACHE_DIR").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ShowcaseError::Config(format!("{key} must be a whole number, got {value:?}")))
}
