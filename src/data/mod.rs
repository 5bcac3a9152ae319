// Data layer for the portfolio site.
// One injectable client that caches GitHub responses and masks failures with fallbacks.

pub mod client;
pub mod view;

pub use client::{
    DEFAULT_EVENTS_PER_PAGE, DEFAULT_IMAGE_REPOS, DataClientBuilder, ErrorHook, GitHubDataClient,
};
pub use view::{select_repositories, sort_repositories};
