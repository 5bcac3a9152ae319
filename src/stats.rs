// Aggregate profile statistics.
// Totals and top languages derived from a profile and its repository list.

use std::collections::HashMap;

use serde::Serialize;

use crate::github::{Repository, UserProfile};

/// Languages listed in the stats panel.
pub const TOP_LANGUAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub repos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitHubStats {
    pub total_repos: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub followers: u64,
    pub following: u64,
    pub top_languages: Vec<LanguageCount>,
}

impl GitHubStats {
    pub fn from_parts(profile: &UserProfile, repos: &[Repository]) -> Self {
        let mut languages: HashMap<&str, u32> = HashMap::new();
        for language in repos.iter().filter_map(|r| r.language.as_deref()) {
            *languages.entry(language).or_default() += 1;
        }

        let mut top_languages: Vec<LanguageCount> = languages
            .into_iter()
            .map(|(language, repos)| LanguageCount {
                language: language.to_string(),
                repos,
            })
            .collect();
        top_languages.sort_by(|a, b| {
            b.repos
                .cmp(&a.repos)
                .then_with(|| a.language.cmp(&b.language))
        });
        top_languages.truncate(TOP_LANGUAGES);

        Self {
            total_repos: profile.public_repos,
            total_stars: repos.iter().map(|r| r.stars).sum(),
            total_forks: repos.iter().map(|r| r.forks).sum(),
            followers: profile.followers,
            following: profile.following,
            top_languages,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn repo(name: &str, language: Option<&str>, stars: u64, forks: u64) -> Repository {
        Repository {
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/octocat/{}", name),
            homepage: None,
            language: language.map(str::to_string),
            stars,
            forks,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            topics: Vec::new(),
            languages: Vec::new(),
        }
    }

    #[test]
    fn test_totals() {
        let mut profile = UserProfile::placeholder("octocat");
        profile.public_repos = 9;
        profile.followers = 4;

        let repos = vec![
            repo("a", Some("Rust"), 5, 1),
            repo("b", Some("Go"), 2, 0),
            repo("c", None, 1, 3),
        ];
        let stats = GitHubStats::from_parts(&profile, &repos);

        assert_eq!(stats.total_repos, 9);
        assert_eq!(stats.total_stars, 8);
        assert_eq!(stats.total_forks, 4);
        assert_eq!(stats.followers, 4);
    }

    #[test]
    fn test_top_languages_ordered_and_capped() {
        let profile = UserProfile::placeholder("octocat");
        let repos = vec![
            repo("a", Some("Rust"), 0, 0),
            repo("b", Some("Rust"), 0, 0),
            repo("c", Some("Go"), 0, 0),
            repo("d", Some("C"), 0, 0),
            repo("e", Some("Python"), 0, 0),
            repo("f", Some("Zig"), 0, 0),
            repo("g", Some("Ada"), 0, 0),
        ];
        let stats = GitHubStats::from_parts(&profile, &repos);

        let names: Vec<&str> = stats
            .top_languages
            .iter()
            .map(|l| l.language.as_str())
            .collect();
        assert_eq!(names, vec!["Rust", "Ada", "C", "Go", "Python"]);
        assert_eq!(stats.top_languages[0].repos, 2);
    }
}
