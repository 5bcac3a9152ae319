// showcase: GitHub data for a personal portfolio site.
// Fetches profile, repositories, activity, and project details with caching,
// request coalescing, and fallbacks.

pub mod activity;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod github;
pub mod logging;
pub mod projects;
pub mod stats;

mod sync;

pub use config::Config;
pub use data::GitHubDataClient;
pub use error::{Result, ShowcaseError};
