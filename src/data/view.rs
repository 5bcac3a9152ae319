// Derived repository views.
// Filters and orders a raw repository list for display.

use std::cmp::Ordering;

use crate::github::{RawRepo, RepoOptions, Repository};

/// Drop forks and archived repositories, optionally drop repositories with
/// neither stars nor a description, order by stars then recency, and apply
/// the limit.
pub fn select_repositories(raw: Vec<RawRepo>, options: &RepoOptions) -> Vec<Repository> {
    let mut repos: Vec<Repository> = raw
        .into_iter()
        .filter(|repo| !repo.fork && !repo.archived)
        .filter(|repo| !options.require_details || has_details(repo))
        .map(Repository::from)
        .collect();

    sort_repositories(&mut repos);

    if let Some(limit) = options.limit {
        repos.truncate(limit);
    }
    repos
}

/// Stars descending, then most recently updated first. Stable.
pub fn sort_repositories(repos: &mut [Repository]) {
    repos.sort_by(compare_repositories);
}

fn compare_repositories(a: &Repository, b: &Repository) -> Ordering {
    b.stars
        .cmp(&a.stars)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

fn has_details(repo: &RawRepo) -> bool {
    repo.stargazers_count > 0
        || repo
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, stars: u64, updated_at: &str, fork: bool, archived: bool) -> RawRepo {
        RawRepo {
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/octocat/{}", name),
            homepage: None,
            language: Some("Rust".to_string()),
            stargazers_count: stars,
            forks_count: 0,
            updated_at: updated_at.parse().unwrap(),
            fork,
            archived,
            topics: Vec::new(),
            default_branch: None,
        }
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_forks_and_archived_removed() {
        let repos = select_repositories(
            vec![
                raw("original", 0, "2024-01-01T00:00:00Z", false, false),
                raw("fork", 10, "2024-01-01T00:00:00Z", true, false),
                raw("old", 10, "2024-01-01T00:00:00Z", false, true),
            ],
            &RepoOptions::default(),
        );
        assert_eq!(names(&repos), vec!["original"]);
    }

    #[test]
    fn test_sorted_by_stars_then_recency() {
        let repos = select_repositories(
            vec![
                raw("older-two", 2, "2024-01-01T00:00:00Z", false, false),
                raw("one", 1, "2024-06-01T00:00:00Z", false, false),
                raw("newer-two", 2, "2024-03-01T00:00:00Z", false, false),
                raw("five", 5, "2023-01-01T00:00:00Z", false, false),
            ],
            &RepoOptions::default(),
        );
        assert_eq!(names(&repos), vec!["five", "newer-two", "older-two", "one"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let repos = select_repositories(
            vec![
                raw("first", 1, "2024-01-01T00:00:00Z", false, false),
                raw("second", 1, "2024-01-01T00:00:00Z", false, false),
            ],
            &RepoOptions::default(),
        );
        assert_eq!(names(&repos), vec!["first", "second"]);
    }

    #[test]
    fn test_require_details_and_limit() {
        let mut described = raw("described", 0, "2024-05-01T00:00:00Z", false, false);
        described.description = Some("A thing".to_string());

        let options = RepoOptions {
            require_details: true,
            limit: Some(2),
            ..RepoOptions::default()
        };
        let repos = select_repositories(
            vec![
                raw("bare", 0, "2024-06-01T00:00:00Z", false, false),
                described,
                raw("starred", 3, "2024-01-01T00:00:00Z", false, false),
                raw("starred-too", 1, "2024-01-01T00:00:00Z", false, false),
            ],
            &options,
        );
        assert_eq!(names(&repos), vec!["starred", "starred-too"]);
    }
}
