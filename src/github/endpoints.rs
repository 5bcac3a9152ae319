// GitHub API endpoint descriptions.
// Builds paths, query parameters, and cache keys for the endpoints the site reads.

use std::fmt;

use crate::error::{Result, ShowcaseError};

/// GitHub caps `per_page` at 100.
pub const MAX_PER_PAGE: u8 = 100;

/// Longest login GitHub accepts.
const MAX_USERNAME_LEN: usize = 39;

/// Longest repository name GitHub accepts.
const MAX_REPO_NAME_LEN: usize = 100;

/// Sort key accepted by the repository list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoSort {
    #[default]
    Updated,
    Pushed,
    Created,
    FullName,
}

impl RepoSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSort::Updated => "updated",
            RepoSort::Pushed => "pushed",
            RepoSort::Created => "created",
            RepoSort::FullName => "full_name",
        }
    }
}

impl fmt::Display for RepoSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RepoSort {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "updated" => Ok(RepoSort::Updated),
            "pushed" => Ok(RepoSort::Pushed),
            "created" => Ok(RepoSort::Created),
            "full_name" => Ok(RepoSort::FullName),
            other => Err(ShowcaseError::Config(format!("unknown repository sort {other:?}"))),
        }
    }
}

/// How the repository list is requested and which derived view is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOptions {
    pub sort: RepoSort,
    pub per_page: u8,
    pub page: u32,
    /// Truncate the sorted view to this many entries.
    pub limit: Option<usize>,
    /// Keep only repositories with a star or a description.
    pub require_details: bool,
    /// Attach each repository's language breakdown.
    pub include_languages: bool,
}

impl Default for RepoOptions {
    fn default() -> Self {
        Self {
            sort: RepoSort::Updated,
            per_page: MAX_PER_PAGE,
            page: 1,
            limit: None,
            require_details: false,
            include_languages: false,
        }
    }
}

impl RepoOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_languages(mut self) -> Self {
        self.include_languages = true;
        self
    }
}

/// A cacheable GitHub GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    User {
        username: String,
    },
    Repos {
        username: String,
        sort: RepoSort,
        per_page: u8,
        page: u32,
    },
    Events {
        username: String,
        per_page: u8,
    },
    Languages {
        owner: String,
        repo: String,
    },
    Readme {
        owner: String,
        repo: String,
    },
}

impl Endpoint {
    pub fn user(username: &str) -> Self {
        Endpoint::User {
            username: username.to_string(),
        }
    }

    pub fn repos(username: &str, options: &RepoOptions) -> Self {
        Endpoint::Repos {
            username: username.to_string(),
            sort: options.sort,
            per_page: clamp_per_page(options.per_page),
            page: options.page.max(1),
        }
    }

    pub fn events(username: &str, per_page: u8) -> Self {
        Endpoint::Events {
            username: username.to_string(),
            per_page: clamp_per_page(per_page),
        }
    }

    pub fn languages(owner: &str, repo: &str) -> Self {
        Endpoint::Languages {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn readme(owner: &str, repo: &str) -> Self {
        Endpoint::Readme {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Path relative to the API base.
    pub fn path(&self) -> String {
        match self {
            Endpoint::User { username } => format!("/users/{}", username),
            Endpoint::Repos { username, .. } => format!("/users/{}/repos", username),
            Endpoint::Events { username, .. } => format!("/users/{}/events/public", username),
            Endpoint::Languages { owner, repo } => format!("/repos/{}/{}/languages", owner, repo),
            Endpoint::Readme { owner, repo } => format!("/repos/{}/{}/readme", owner, repo),
        }
    }

    /// Query parameters in a fixed order.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::User { .. } | Endpoint::Languages { .. } | Endpoint::Readme { .. } => {
                Vec::new()
            }
            Endpoint::Repos {
                sort,
                per_page,
                page,
                ..
            } => vec![
                ("sort", sort.as_str().to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
            Endpoint::Events { per_page, .. } => vec![("per_page", per_page.to_string())],
        }
    }

    /// Cache key: path plus canonical query string.
    pub fn cache_key(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            return self.path();
        }
        let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", self.path(), params.join("&"))
    }
}

fn clamp_per_page(per_page: u8) -> u8 {
    per_page.clamp(1, MAX_PER_PAGE)
}

/// Check that a username is something GitHub could have issued.
/// Returns the trimmed login.
pub fn validate_username(username: &str) -> Result<&str> {
    let trimmed = username.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= MAX_USERNAME_LEN
        && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(trimmed)
    } else {
        Err(ShowcaseError::InvalidUsername(username.to_string()))
    }
}

/// Check a repository name before it is placed in a request path.
pub fn validate_repo_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= MAX_REPO_NAME_LEN
        && trimmed != "."
        && trimmed != ".."
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(trimmed)
    } else {
        Err(ShowcaseError::InvalidRepository(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_endpoint() {
        let endpoint = Endpoint::user("octocat");
        assert_eq!(endpoint.path(), "/users/octocat");
        assert!(endpoint.query().is_empty());
        assert_eq!(endpoint.cache_key(), "/users/octocat");
    }

    #[test]
    fn test_repos_endpoint_key_includes_params() {
        let options = RepoOptions::default().with_per_page(10);
        let endpoint = Endpoint::repos("octocat", &options);

        assert_eq!(endpoint.path(), "/users/octocat/repos");
        assert_eq!(
            endpoint.cache_key(),
            "/users/octocat/repos?sort=updated&per_page=10&page=1"
        );
    }

    #[test]
    fn test_limit_does_not_change_key() {
        let plain = Endpoint::repos("octocat", &RepoOptions::default());
        let limited = Endpoint::repos("octocat", &RepoOptions::default().with_limit(6));
        assert_eq!(plain.cache_key(), limited.cache_key());
    }

    #[test]
    fn test_per_page_clamped() {
        let endpoint = Endpoint::events("octocat", 0);
        assert_eq!(endpoint.cache_key(), "/users/octocat/events/public?per_page=1");

        let endpoint = Endpoint::repos("octocat", &RepoOptions::default().with_per_page(250));
        assert!(endpoint.cache_key().contains("per_page=100"));
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(" octocat ").unwrap(), "octocat");
        assert_eq!(validate_username("some-user-42").unwrap(), "some-user-42");
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("../etc").is_err());
        assert!(validate_username(&"a".repeat(40)).is_err());
    }

    #[test]
    fn test_repo_scoped_endpoints() {
        let languages = Endpoint::languages("octocat", "hello-world");
        assert_eq!(languages.path(), "/repos/octocat/hello-world/languages");
        assert_eq!(languages.cache_key(), "/repos/octocat/hello-world/languages");

        let readme = Endpoint::readme("octocat", "hello-world");
        assert_eq!(readme.cache_key(), "/repos/octocat/hello-world/readme");
        assert_ne!(readme.cache_key(), languages.cache_key());
    }

    #[test]
    fn test_validate_repo_name() {
        assert_eq!(validate_repo_name("hello_world.rs").unwrap(), "hello_world.rs");
        assert!(validate_repo_name("").is_err());
        assert!(validate_repo_name("..").is_err());
        assert!(validate_repo_name("a/b").is_err());
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("pushed".parse::<RepoSort>().unwrap(), RepoSort::Pushed);
        assert_eq!(RepoSort::FullName.to_string(), "full_name");
        assert!("stars".parse::<RepoSort>().is_err());
    }
}
