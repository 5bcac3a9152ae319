// GitHub API response types.
// Wire structs for the REST API plus the trimmed snapshots handed to the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login used by the placeholder profile served when nothing else is available.
pub const PLACEHOLDER_LOGIN: &str = "placeholder";

/// GitHub user as returned by `GET /users/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
}

/// GitHub repository as returned by `GET /users/{username}/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRepo {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    pub default_branch: Option<String>,
}

/// README as returned by `GET /repos/{owner}/{repo}/readme`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReadme {
    /// Base64 with embedded newlines when `encoding` is `base64`.
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// Repository reference embedded in an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

/// Event payload; only the commit list of push events is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    pub commits: Option<Vec<serde_json::Value>>,
}

/// Public event as returned by `GET /users/{username}/events/public`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: EventRepo,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: EventPayload,
}

/// Profile snapshot shown in the hero and about sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub location: Option<String>,
}

impl UserProfile {
    /// Static profile served when the API fails and nothing is cached.
    pub fn placeholder(username: &str) -> Self {
        Self {
            login: PLACEHOLDER_LOGIN.to_string(),
            name: if username.trim().is_empty() {
                "Portfolio Owner".to_string()
            } else {
                username.trim().to_string()
            },
            bio: Some("Full-Stack Developer".to_string()),
            avatar_url: None,
            followers: 0,
            following: 0,
            public_repos: 0,
            created_at: None,
            html_url: format!("https://github.com/{}", username.trim()),
            location: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.login == PLACEHOLDER_LOGIN
    }
}

impl From<RawUser> for UserProfile {
    fn from(raw: RawUser) -> Self {
        let html_url = raw
            .html_url
            .unwrap_or_else(|| format!("https://github.com/{}", raw.login));
        Self {
            name: raw.name.unwrap_or_else(|| raw.login.clone()),
            login: raw.login,
            bio: raw.bio,
            avatar_url: raw.avatar_url,
            followers: raw.followers,
            following: raw.following,
            public_repos: raw.public_repos,
            created_at: raw.created_at,
            html_url,
            location: raw.location,
        }
    }
}

/// One language's share of a repository, by bytes of code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    /// Rounded to one decimal place.
    pub percentage: f64,
}

/// Repository card shown in the projects section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub updated_at: DateTime<Utc>,
    pub topics: Vec<String>,
    /// Filled in only when languages were requested.
    #[serde(default)]
    pub languages: Vec<LanguageShare>,
}

impl Repository {
    /// Static list served when the API fails and nothing is cached.
    pub fn placeholders(username: &str) -> Vec<Self> {
        vec![Self {
            name: "portfolio-website".to_string(),
            description: Some(
                "Personal portfolio website built with modern web technologies".to_string(),
            ),
            html_url: format!("https://github.com/{}/portfolio-website", username.trim()),
            homepage: None,
            language: Some("Rust".to_string()),
            stars: 0,
            forks: 0,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            topics: vec!["portfolio".to_string()],
            languages: Vec::new(),
        }]
    }
}

impl From<RawRepo> for Repository {
    fn from(raw: RawRepo) -> Self {
        Self {
            name: raw.name,
            description: raw.description,
            html_url: raw.html_url,
            homepage: raw.homepage.filter(|h| !h.is_empty()),
            language: raw.language,
            stars: raw.stargazers_count,
            forks: raw.forks_count,
            updated_at: raw.updated_at,
            topics: raw.topics,
            languages: Vec::new(),
        }
    }
}

/// Entry in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: String,
    pub repo: String,
    pub created_at: DateTime<Utc>,
    /// Commits carried by a push event; zero for other kinds.
    pub commits: u32,
}

impl From<RawEvent> for ActivityEvent {
    fn from(raw: RawEvent) -> Self {
        let commits = if raw.kind == "PushEvent" {
            // A push without a commit list still counts once.
            match raw.payload.commits {
                Some(list) if !list.is_empty() => list.len() as u32,
                _ => 1,
            }
        } else {
            0
        };
        Self {
            kind: raw.kind,
            repo: raw.repo.name,
            created_at: raw.created_at,
            commits,
        }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Unix timestamp when the window resets.
    pub reset: u64,
}

impl RateLimit {
    /// True once the headers reported an exhausted window.
    pub fn is_exhausted(&self) -> bool {
        self.limit > 0 && self.remaining == 0
    }
}
