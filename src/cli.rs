// Command-line interface definition.
// Flags and subcommands for the showcase binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use showcase::github::RepoSort;

#[derive(Debug, Parser)]
#[command(name = "showcase", version, about = "Print cached GitHub data for a portfolio site")]
pub struct Cli {
    /// GitHub login to show (defaults to SHOWCASE_USERNAME / GITHUB_USERNAME).
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Seconds a cached response stays fresh.
    #[arg(long, global = true)]
    pub ttl_secs: Option<u64>,

    /// Do not read or write the on-disk snapshot.
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Directory for the on-disk snapshot.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Updated,
    Pushed,
    Created,
    FullName,
}

impl From<SortArg> for RepoSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Updated => RepoSort::Updated,
            SortArg::Pushed => RepoSort::Pushed,
            SortArg::Created => RepoSort::Created,
            SortArg::FullName => RepoSort::FullName,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the profile.
    Profile,
    /// List repositories, best first.
    Repos {
        /// Show at most this many repositories.
        #[arg(short, long)]
        limit: Option<usize>,
        /// Sort order requested from GitHub.
        #[arg(long, value_enum, default_value_t = SortArg::Updated)]
        sort: SortArg,
        /// Hide repositories with no stars and no description.
        #[arg(long)]
        featured: bool,
        /// Fetch each repository's language breakdown.
        #[arg(long)]
        languages: bool,
    },
    /// Show totals and top languages.
    Stats,
    /// Show recent public activity and monthly commits.
    Activity {
        #[arg(long, default_value_t = showcase::data::DEFAULT_EVENTS_PER_PAGE)]
        per_page: u8,
    },
    /// List images referenced by recently updated READMEs.
    Images {
        /// Number of recently updated repositories to scan.
        #[arg(long, default_value_t = showcase::data::DEFAULT_IMAGE_REPOS)]
        repos: u8,
    },
    /// Re-fetch profile and repositories, ignoring the cache.
    Refresh,
}
