// GitHub API HTTP client.
// Handles headers, timeouts, rate limit tracking, and response status classification.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, ShowcaseError};
use crate::sync::lock;

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Longest response body excerpt kept in an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// Source of JSON documents for the data client.
///
/// `GitHubClient` is the production implementation; tests substitute
/// an in-memory fake.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` with `query` and decode the body as JSON.
    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value>;

    /// Last rate limit reported by the API, if known.
    fn rate_limit(&self) -> Option<RateLimit> {
        None
    }
}

/// GitHub API client with optional authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client from configuration. A token is optional; the
    /// public endpoints work anonymously at a lower rate limit.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ShowcaseError::Config(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ShowcaseError::Config(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ShowcaseError::Api)?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Get the current rate limit information.
    pub fn current_rate_limit(&self) -> RateLimit {
        *lock(&self.rate_limit)
    }

    /// Fail fast while the tracked window is exhausted.
    fn check_budget(&self) -> Result<()> {
        let limit = self.current_rate_limit();
        if limit.is_exhausted() && limit.reset > Utc::now().timestamp().max(0) as u64 {
            return Err(ShowcaseError::RateLimited {
                reset_at: format_reset(limit.reset),
            });
        }
        Ok(())
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, headers: &HeaderMap) {
        let mut rate_limit = lock(&self.rate_limit);
        apply_rate_limit_headers(&mut rate_limit, headers);
    }
}

#[async_trait]
impl Transport for GitHubClient {
    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value> {
        self.check_budget()?;

        let url = format!("{}{}", self.api_base, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(ShowcaseError::Api)?;

        self.update_rate_limit(response.headers());

        let status = response.status();
        if matches!(
            status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED
        ) {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(
            status,
            &self.current_rate_limit(),
            &url,
            &body,
        ))
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(self.current_rate_limit())
    }
}

/// Copy `x-ratelimit-*` headers into `rate_limit`, keeping old values
/// for headers that are missing or unparseable.
fn apply_rate_limit_headers(rate_limit: &mut RateLimit, headers: &HeaderMap) {
    let header = |name: &str| -> Option<u64> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    };

    if let Some(limit) = header("x-ratelimit-limit") {
        rate_limit.limit = limit;
    }
    if let Some(remaining) = header("x-ratelimit-remaining") {
        rate_limit.remaining = remaining;
    }
    if let Some(reset) = header("x-ratelimit-reset") {
        rate_limit.reset = reset;
    }
}

/// Convert a non-success status into an error.
fn classify_status(
    status: StatusCode,
    rate_limit: &RateLimit,
    url: &str,
    body: &str,
) -> ShowcaseError {
    match status {
        StatusCode::UNAUTHORIZED => ShowcaseError::Unauthorized,
        StatusCode::NOT_FOUND => ShowcaseError::NotFound(url.to_string()),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit.remaining == 0 => {
            ShowcaseError::RateLimited {
                reset_at: format_reset(rate_limit.reset),
            }
        }
        status => ShowcaseError::Http {
            status: status.as_u16(),
            message: excerpt(body),
        },
    }
}

fn format_reset(reset: u64) -> String {
    chrono::DateTime::from_timestamp(reset as i64, 0)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));

        let mut limit = RateLimit::default();
        apply_rate_limit_headers(&mut limit, &headers);

        assert_eq!(limit.limit, 60);
        assert_eq!(limit.remaining, 0);
        assert_eq!(limit.reset, 1_700_000_000);
        assert!(limit.is_exhausted());
    }

    #[test]
    fn test_rate_limit_headers_partial() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("nope"));

        let mut limit = RateLimit {
            limit: 60,
            remaining: 12,
            reset: 5,
        };
        apply_rate_limit_headers(&mut limit, &headers);
        assert_eq!(limit.remaining, 12);
    }

    #[test]
    fn test_forbidden_with_exhausted_budget_is_rate_limited() {
        let limit = RateLimit {
            limit: 60,
            remaining: 0,
            reset: 0,
        };
        let err = classify_status(StatusCode::FORBIDDEN, &limit, "u", "");
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_forbidden_with_budget_is_http_error() {
        let limit = RateLimit {
            limit: 60,
            remaining: 30,
            reset: 0,
        };
        let err = classify_status(StatusCode::FORBIDDEN, &limit, "u", "blocked");
        assert!(matches!(err, ShowcaseError::Http { status: 403, .. }));
    }

    #[test]
    fn test_not_found_and_unauthorized() {
        let limit = RateLimit::default();
        let err = classify_status(StatusCode::NOT_FOUND, &limit, "https://x/users/nobody", "");
        assert!(matches!(err, ShowcaseError::NotFound(url) if url.ends_with("nobody")));

        let err = classify_status(StatusCode::UNAUTHORIZED, &limit, "u", "");
        assert!(matches!(err, ShowcaseError::Unauthorized));
    }

    #[test]
    fn test_excerpt_truncates() {
        let body = "x".repeat(500);
        let short = excerpt(&body);
        assert_eq!(short.len(), BODY_EXCERPT_LEN + 3);
        assert_eq!(excerpt("  ok  "), "ok");
    }

    #[test]
    fn test_client_builds_without_token() {
        let config = Config::default();
        let client = GitHubClient::new(&config).unwrap();
        assert_eq!(client.api_base, "https://api.github.com");
        assert_eq!(client.current_rate_limit(), RateLimit::default());
        assert!(client.check_budget().is_ok());
    }
}
