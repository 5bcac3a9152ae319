// showcase binary entry point.
// Loads configuration, builds the data client, and prints the requested section.

mod cli;

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use showcase::activity::{describe_event, monthly_commits};
use showcase::github::{ActivityEvent, RepoOptions, Repository, UserProfile};
use showcase::projects::ProjectImages;
use showcase::stats::GitHubStats;
use showcase::{Config, GitHubDataClient, ShowcaseError, logging};

use cli::{Cli, Command, OutputFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("showcase=info");

    let cli = Cli::parse();
    let config = merge_config(Config::from_env()?, &cli);
    let username = config.username.clone().ok_or_else(|| {
        ShowcaseError::Config(
            "no username; pass --username or set SHOWCASE_USERNAME".to_string(),
        )
    })?;

    let client = GitHubDataClient::from_config(&config)?;

    match cli.command {
        Command::Profile => {
            let profile = client.fetch_user_profile(&username).await;
            emit(cli.format, &profile, format_profile)?;
        }
        Command::Repos {
            limit,
            sort,
            featured,
            languages,
        } => {
            let options = RepoOptions {
                sort: sort.into(),
                per_page: config.per_page,
                limit,
                require_details: featured,
                include_languages: languages,
                ..RepoOptions::default()
            };
            let repos = client.fetch_repositories(&username, &options).await;
            emit(cli.format, &repos, |r| format_repos(r))?;
        }
        Command::Stats => {
            let stats = client.fetch_stats(&username).await;
            emit(cli.format, &stats, format_stats)?;
        }
        Command::Activity { per_page } => {
            let events = client.fetch_activity(&username, per_page).await;
            emit(cli.format, &events, |e| format_activity(e))?;
        }
        Command::Images { repos } => {
            let projects = client.fetch_project_images(&username, repos).await;
            emit(cli.format, &projects, |p| format_images(p))?;
        }
        Command::Refresh => {
            client.refresh(&username).await;
            if client.last_error().is_none() {
                eprintln!("Refreshed GitHub data for {}", username);
            }
        }
    }

    for err in client.errors() {
        eprintln!("warning: showing cached or placeholder data: {}", err);
    }

    Ok(())
}

/// Command-line flags win over environment values.
fn merge_config(mut config: Config, cli: &Cli) -> Config {
    if let Some(username) = &cli.username {
        config.username = Some(username.clone());
    }
    if let Some(secs) = cli.ttl_secs {
        config.ttl = Duration::from_secs(secs);
    }
    if cli.no_persist {
        config.persist = false;
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    config
}

fn emit<T, F>(format: OutputFormat, value: &T, pretty: F) -> serde_json::Result<()>
where
    T: Serialize + ?Sized,
    F: Fn(&T) -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Pretty => println!("{}", pretty(value)),
    }
    Ok(())
}

fn format_profile(profile: &UserProfile) -> String {
    let mut lines = vec![format!("{} (@{})", profile.name, profile.login)];
    if let Some(bio) = &profile.bio {
        lines.push(bio.clone());
    }
    if let Some(location) = &profile.location {
        lines.push(format!("Location: {}", location));
    }
    lines.push(format!(
        "Repos: {}  Followers: {}  Following: {}",
        profile.public_repos, profile.followers, profile.following
    ));
    if let Some(created) = profile.created_at {
        lines.push(format!("Joined: {}", created.format("%b %-d, %Y")));
    }
    lines.push(profile.html_url.clone());
    lines.join("\n")
}

fn format_repos(repos: &[Repository]) -> String {
    if repos.is_empty() {
        return "No repositories".to_string();
    }
    repos
        .iter()
        .map(|repo| {
            let mut line = format!(
                "{:<30} ★{:<5} ⑂{:<4} {:<12} {}",
                repo.name,
                repo.stars,
                repo.forks,
                repo.language.as_deref().unwrap_or("-"),
                repo.description.as_deref().unwrap_or("No description available"),
            );
            if !repo.languages.is_empty() {
                let shares: Vec<String> = repo
                    .languages
                    .iter()
                    .map(|l| format!("{} {:.1}%", l.name, l.percentage))
                    .collect();
                line.push_str(&format!("\n{:<30} {}", "", shares.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_stats(stats: &GitHubStats) -> String {
    let mut lines = vec![
        format!("Repositories: {}", stats.total_repos),
        format!("Stars:        {}", stats.total_stars),
        format!("Forks:        {}", stats.total_forks),
        format!("Followers:    {}", stats.followers),
        format!("Following:    {}", stats.following),
    ];
    if !stats.top_languages.is_empty() {
        let languages: Vec<String> = stats
            .top_languages
            .iter()
            .map(|l| format!("{} ({})", l.language, l.repos))
            .collect();
        lines.push(format!("Languages:    {}", languages.join(", ")));
    }
    lines.join("\n")
}

fn format_activity(events: &[ActivityEvent]) -> String {
    let mut lines: Vec<String> = events
        .iter()
        .map(|event| {
            format!(
                "{}  {} {}",
                event.created_at.format("%Y-%m-%d"),
                describe_event(&event.kind),
                event.repo
            )
        })
        .collect();
    if lines.is_empty() {
        lines.push("No recent activity".to_string());
    }

    lines.push(String::new());
    for month in monthly_commits(events, Utc::now()) {
        lines.push(format!("{:<9} {}", month.label, month.commits));
    }
    lines.join("\n")
}

fn format_images(projects: &[ProjectImages]) -> String {
    if projects.is_empty() {
        return "No README images found".to_string();
    }
    let mut lines = Vec::new();
    for project in projects {
        lines.push(format!("{} ({})", project.repo_name, project.repo_url));
        for image in &project.images {
            lines.push(format!("  {}", image));
        }
    }
    lines.join("\n")
}
