// Project detail helpers.
// Language breakdowns and screenshot URLs pulled from repository READMEs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::github::{LanguageShare, RawReadme};

/// Branch assumed when a repository does not report one.
pub const DEFAULT_BRANCH: &str = "main";

const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// Markdown image: `![alt](url "optional title")`.
static IMAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#)
        .expect("Invalid markdown image regex")
});

/// Images found in one repository's README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectImages {
    pub repo_name: String,
    pub repo_url: String,
    pub description: Option<String>,
    pub images: Vec<String>,
}

/// Byte counts from the languages endpoint as percentages, largest first.
pub fn language_shares(bytes: BTreeMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = bytes.values().sum();

    let mut shares: Vec<LanguageShare> = bytes
        .into_iter()
        .map(|(name, bytes)| LanguageShare {
            percentage: percentage(bytes, total),
            name,
            bytes,
        })
        .collect();
    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
    shares
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

/// README text. GitHub wraps the base64 body at 60 columns.
pub fn decode_readme(readme: &RawReadme) -> Result<String> {
    if !readme.encoding.is_empty() && readme.encoding != "base64" {
        return Ok(readme.content.clone());
    }

    let compact: String = readme
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Image URLs in `markdown`, in document order. Relative paths are
/// resolved against the repository's raw content on `branch`.
pub fn readme_images(markdown: &str, owner: &str, repo: &str, branch: &str) -> Vec<String> {
    IMAGE_PATTERN
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(1))
        .map(|url| resolve_image_url(url.as_str(), owner, repo, branch))
        .collect()
}

fn resolve_image_url(url: &str, owner: &str, repo: &str, branch: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let path = url.trim_start_matches("./").trim_start_matches('/');
    format!("{RAW_CONTENT_BASE}/{owner}/{repo}/{branch}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_shares() {
        let bytes = BTreeMap::from([
            ("Shell".to_string(), 250),
            ("Rust".to_string(), 700),
            ("Dockerfile".to_string(), 50),
        ]);
        let shares = language_shares(bytes);

        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Shell", "Dockerfile"]);
        assert_eq!(shares[0].percentage, 70.0);
        assert_eq!(shares[1].percentage, 25.0);
        assert_eq!(shares[2].percentage, 5.0);
    }

    #[test]
    fn test_language_shares_round_to_tenths() {
        let bytes = BTreeMap::from([("C".to_string(), 1), ("Go".to_string(), 2)]);
        let shares = language_shares(bytes);
        assert_eq!(shares[0].percentage, 66.7);
        assert_eq!(shares[1].percentage, 33.3);

        assert!(language_shares(BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_decode_wrapped_readme() {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode("# Demo\n\n![shot](docs/shot.png)\n");
        let (head, tail) = encoded.split_at(10);
        let readme = RawReadme {
            content: format!("{head}\n{tail}\n"),
            encoding: "base64".to_string(),
        };

        let markdown = decode_readme(&readme).unwrap();
        assert!(markdown.starts_with("# Demo"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let readme = RawReadme {
            content: "not*base64!".to_string(),
            encoding: "base64".to_string(),
        };
        assert!(decode_readme(&readme).is_err());
    }

    #[test]
    fn test_readme_images_resolved() {
        let markdown = r#"
# hello-world

![demo](./docs/demo.gif)
Some text ![badge](https://img.shields.io/badge/rust-1.85-orange "Rust")
![](/assets/logo.png)
[not an image](https://example.com/page)
"#;
        let images = readme_images(markdown, "octocat", "hello-world", "trunk");

        assert_eq!(
            images,
            vec![
                "https://raw.githubusercontent.com/octocat/hello-world/trunk/docs/demo.gif",
                "https://img.shields.io/badge/rust-1.85-orange",
                "https://raw.githubusercontent.com/octocat/hello-world/trunk/assets/logo.png",
            ]
        );
    }

    #[test]
    fn test_readme_without_images() {
        assert!(readme_images("# Just text", "octocat", "hello-world", DEFAULT_BRANCH).is_empty());
    }
}
