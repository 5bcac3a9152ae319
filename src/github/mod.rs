// GitHub API module.
// Transport, endpoint descriptions, and types for the public REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GitHubClient, Transport};
pub use endpoints::{Endpoint, RepoOptions, RepoSort, validate_repo_name, validate_username};
pub use types::*;
