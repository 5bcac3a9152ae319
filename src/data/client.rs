// Cached GitHub data client.
// Serves GitHub data from cache or the API, never failing toward the caller.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheState, Clock, MemoryCache, SnapshotStore, SystemClock};
use crate::config::{Config, DEFAULT_TTL};
use crate::error::{Result, ShowcaseError};
use crate::github::{
    ActivityEvent, Endpoint, GitHubClient, LanguageShare, RateLimit, RawEvent, RawReadme, RawRepo,
    RawUser, RepoOptions, Repository, Transport, UserProfile, validate_repo_name,
    validate_username,
};
use crate::projects::{
    DEFAULT_BRANCH, ProjectImages, decode_readme, language_shares, readme_images,
};
use crate::stats::GitHubStats;
use crate::sync::lock;

use super::view::select_repositories;

/// Events requested for the activity feed by default.
pub const DEFAULT_EVENTS_PER_PAGE: u8 = 100;

/// Recently updated repositories scanned for README images by default.
pub const DEFAULT_IMAGE_REPOS: u8 = 20;

/// Failure slot for rejected usernames and repository names.
const INPUT_KEY: &str = "input";

/// Called once for every failure the client masks.
pub type ErrorHook = Arc<dyn Fn(&ShowcaseError) + Send + Sync>;

type FetchResult = std::result::Result<Value, Arc<ShowcaseError>>;
type InFlight = Shared<BoxFuture<'static, FetchResult>>;

struct Inner {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    cache: Mutex<MemoryCache>,
    /// Pending live fetches by cache key; concurrent callers share one.
    in_flight: Mutex<HashMap<String, InFlight>>,
    /// Serializes snapshot writes.
    store: Option<Mutex<SnapshotStore>>,
    /// Unresolved failures by cache key, oldest first.
    failures: Mutex<Vec<(String, Arc<ShowcaseError>)>>,
    error_hook: Option<ErrorHook>,
    repo_options: RepoOptions,
}

/// Handle to the site's GitHub data. Cloning is cheap and clones share
/// the cache, so build one at startup and pass it to every consumer.
#[derive(Clone)]
pub struct GitHubDataClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for GitHubDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubDataClient")
            .field("cached_keys", &lock(&self.inner.cache).len())
            .field("persistent", &self.inner.store.is_some())
            .finish()
    }
}

/// Builder for [`GitHubDataClient`].
pub struct DataClientBuilder {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    store: Option<SnapshotStore>,
    error_hook: Option<ErrorHook>,
    repo_options: RepoOptions,
}

impl DataClientBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Persist successful payloads and restore them on build.
    pub fn snapshot_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ShowcaseError) + Send + Sync + 'static,
    {
        self.error_hook = Some(Arc::new(hook));
        self
    }

    /// Repository request used by `refresh` and `fetch_stats`.
    pub fn repo_options(mut self, options: RepoOptions) -> Self {
        self.repo_options = options;
        self
    }

    pub fn build(self) -> GitHubDataClient {
        let mut cache = MemoryCache::new(self.ttl);

        if let Some(store) = &self.store {
            match store.load() {
                Ok(entries) => {
                    let path = store.path().display();
                    debug!(count = entries.len(), path = %path, "Restored cache snapshot");
                    cache.restore(entries);
                }
                Err(e) => {
                    let path = store.path().display();
                    warn!(path = %path, error = %e, "Ignoring unreadable cache snapshot");
                }
            }
        }

        GitHubDataClient {
            inner: Arc::new(Inner {
                transport: self.transport,
                clock: self.clock,
                cache: Mutex::new(cache),
                in_flight: Mutex::new(HashMap::new()),
                store: self.store.map(Mutex::new),
                failures: Mutex::new(Vec::new()),
                error_hook: self.error_hook,
                repo_options: self.repo_options,
            }),
        }
    }
}

impl GitHubDataClient {
    pub fn builder(transport: Arc<dyn Transport>) -> DataClientBuilder {
        DataClientBuilder {
            transport,
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_TTL,
            store: None,
            error_hook: None,
            repo_options: RepoOptions::default(),
        }
    }

    /// Client backed by the real API, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(GitHubClient::new(config)?);
        let mut builder = Self::builder(transport)
            .ttl(config.ttl)
            .repo_options(RepoOptions::default().with_per_page(config.per_page));

        if config.persist {
            builder = builder.snapshot_store(SnapshotStore::in_dir(config.cache_dir.as_deref())?);
        }

        Ok(builder.build())
    }

    /// Profile for `username`: fresh cache, live data, stale cache, or the
    /// placeholder profile, in that order.
    pub async fn fetch_user_profile(&self, username: &str) -> UserProfile {
        self.profile(username, false).await
    }

    /// Non-fork, non-archived repositories ordered by stars then recency,
    /// with the same fallback chain as profiles. Language breakdowns are
    /// attached when `options.include_languages` is set.
    pub async fn fetch_repositories(
        &self,
        username: &str,
        options: &RepoOptions,
    ) -> Vec<Repository> {
        self.repositories(username, options, false).await
    }

    /// Re-fetch profile and repositories regardless of cache age. Entries
    /// are only replaced when the fetch succeeds.
    pub async fn refresh(&self, username: &str) {
        let options = self.inner.repo_options.clone();
        futures::join!(
            self.profile(username, true),
            self.repositories(username, &options, true)
        );
    }

    /// Totals over every repository in the list, forks and archived
    /// repositories included.
    pub async fn fetch_stats(&self, username: &str) -> GitHubStats {
        let options = self.inner.repo_options.clone();
        let (profile, raw) = futures::join!(
            self.profile(username, false),
            self.raw_repositories(username, &options, false)
        );
        let repos = match raw {
            Some(raw) => raw.into_iter().map(Repository::from).collect(),
            None => Repository::placeholders(username),
        };
        GitHubStats::from_parts(&profile, &repos)
    }

    /// Language breakdown of one repository, largest share first. Empty
    /// when nothing could be fetched or cached.
    pub async fn fetch_languages(&self, owner: &str, repo: &str) -> Vec<LanguageShare> {
        let Some(login) = self.checked(owner) else {
            return Vec::new();
        };
        let name = match validate_repo_name(repo) {
            Ok(name) => name,
            Err(e) => {
                self.inner.record_failure(INPUT_KEY, Arc::new(e));
                return Vec::new();
            }
        };

        self.load::<BTreeMap<String, u64>>(Endpoint::languages(login, name), false)
            .await
            .map(language_shares)
            .unwrap_or_default()
    }

    /// Images referenced by the READMEs of the `max_repos` most recently
    /// updated repositories. Repositories without a readable README or
    /// without images are left out.
    pub async fn fetch_project_images(&self, username: &str, max_repos: u8) -> Vec<ProjectImages> {
        let Some(login) = self.checked(username) else {
            return Vec::new();
        };
        let options = RepoOptions::default().with_per_page(max_repos);
        let Some(repos) = self.raw_repositories(login, &options, false).await else {
            return Vec::new();
        };

        join_all(repos.into_iter().map(|repo| self.project_images(login, repo)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Recent public events, newest first. Falls back to stale events or
    /// an empty feed.
    pub async fn fetch_activity(&self, username: &str, per_page: u8) -> Vec<ActivityEvent> {
        let Some(login) = self.checked(username) else {
            return Vec::new();
        };

        self.load::<Vec<RawEvent>>(Endpoint::events(login, per_page), false)
            .await
            .map(|events| events.into_iter().map(ActivityEvent::from).collect())
            .unwrap_or_default()
    }

    /// Most recent masked failure that has not been resolved. A failure
    /// is resolved by the next successful live fetch of the same key.
    pub fn last_error(&self) -> Option<Arc<ShowcaseError>> {
        lock(&self.inner.failures)
            .last()
            .map(|(_, error)| Arc::clone(error))
    }

    /// Every unresolved failure, oldest first.
    pub fn errors(&self) -> Vec<Arc<ShowcaseError>> {
        lock(&self.inner.failures)
            .iter()
            .map(|(_, error)| Arc::clone(error))
            .collect()
    }

    pub fn cache_state(&self, endpoint: &Endpoint) -> CacheState {
        let key = endpoint.cache_key();
        if lock(&self.inner.in_flight).contains_key(&key) {
            return CacheState::Fetching;
        }
        lock(&self.inner.cache).state(&key, self.inner.clock.now())
    }

    /// Mark an endpoint stale so the next read goes to the network.
    pub fn invalidate(&self, endpoint: &Endpoint) -> bool {
        lock(&self.inner.cache).invalidate(&endpoint.cache_key())
    }

    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.inner.transport.rate_limit()
    }

    async fn profile(&self, username: &str, force: bool) -> UserProfile {
        let Some(login) = self.checked(username) else {
            return UserProfile::placeholder(username);
        };

        match self.load::<RawUser>(Endpoint::user(login), force).await {
            Some(raw) => UserProfile::from(raw),
            None => {
                debug!(username = login, "Serving placeholder profile");
                UserProfile::placeholder(login)
            }
        }
    }

    async fn repositories(
        &self,
        username: &str,
        options: &RepoOptions,
        force: bool,
    ) -> Vec<Repository> {
        let Some(raw) = self.raw_repositories(username, options, force).await else {
            debug!(username, "Serving placeholder repositories");
            return Repository::placeholders(username);
        };

        let mut repos = select_repositories(raw, options);
        if options.include_languages {
            let owner = username.trim();
            let languages =
                join_all(repos.iter().map(|repo| self.fetch_languages(owner, &repo.name))).await;
            for (repo, languages) in repos.iter_mut().zip(languages) {
                repo.languages = languages;
            }
        }
        repos
    }

    /// Unfiltered repository list, or `None` when nothing is available.
    async fn raw_repositories(
        &self,
        username: &str,
        options: &RepoOptions,
        force: bool,
    ) -> Option<Vec<RawRepo>> {
        let login = self.checked(username)?;
        self.load::<Vec<RawRepo>>(Endpoint::repos(login, options), force)
            .await
    }

    async fn project_images(&self, owner: &str, repo: RawRepo) -> Option<ProjectImages> {
        let endpoint = Endpoint::readme(owner, &repo.name);
        let key = endpoint.cache_key();
        let readme = self.load::<RawReadme>(endpoint, false).await?;

        let markdown = match decode_readme(&readme) {
            Ok(markdown) => markdown,
            Err(e) => {
                self.inner.record_failure(&key, Arc::new(e));
                return None;
            }
        };
        let branch = repo.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH);
        let images = readme_images(&markdown, owner, &repo.name, branch);
        if images.is_empty() {
            return None;
        }

        Some(ProjectImages {
            repo_name: repo.name,
            repo_url: repo.html_url,
            description: repo.description,
            images,
        })
    }

    /// Validated login, or `None` after recording the failure.
    fn checked<'a>(&self, username: &'a str) -> Option<&'a str> {
        match validate_username(username) {
            Ok(login) => {
                self.inner.resolve(INPUT_KEY);
                Some(login)
            }
            Err(e) => {
                self.inner.record_failure(INPUT_KEY, Arc::new(e));
                None
            }
        }
    }

    /// Fresh cache, else a (possibly shared) live fetch, else stale cache.
    async fn load<T>(&self, endpoint: Endpoint, force: bool) -> Option<T>
    where
        T: DeserializeOwned + Serialize + Send + 'static,
    {
        let key = endpoint.cache_key();

        if !force {
            let fresh = lock(&self.inner.cache)
                .get_fresh(&key, self.inner.clock.now())
                .map(|entry| entry.payload.clone());
            if let Some(payload) = fresh {
                match serde_json::from_value(payload) {
                    Ok(value) => {
                        debug!(key = %key, "Cache hit");
                        return Some(value);
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cached payload unreadable, refetching");
                    }
                }
            }
        }

        if let Ok(payload) = self.shared_fetch::<T>(endpoint, &key).await {
            match serde_json::from_value(payload) {
                Ok(value) => return Some(value),
                Err(e) => self.inner.record_failure(&key, Arc::new(e.into())),
            }
        }

        let stale = lock(&self.inner.cache)
            .get(&key)
            .map(|entry| entry.payload.clone())?;
        debug!(key = %key, "Serving stale cache entry");
        serde_json::from_value(stale).ok()
    }

    /// Join the in-flight fetch for `key`, or start one.
    fn shared_fetch<T>(&self, endpoint: Endpoint, key: &str) -> InFlight
    where
        T: DeserializeOwned + Serialize + Send + 'static,
    {
        let mut in_flight = lock(&self.inner.in_flight);
        if let Some(pending) = in_flight.get(key) {
            debug!(key, "Joining in-flight request");
            return pending.clone();
        }

        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        let fetch = async move {
            let outcome = inner.fetch_live::<T>(&endpoint, &owned_key).await;
            lock(&inner.in_flight).remove(&owned_key);
            outcome
        }
        .boxed()
        .shared();

        in_flight.insert(key.to_string(), fetch.clone());
        fetch
    }
}

impl Inner {
    async fn fetch_live<T>(&self, endpoint: &Endpoint, key: &str) -> FetchResult
    where
        T: DeserializeOwned + Serialize,
    {
        info!(key, "Fetching from GitHub");

        let result = self
            .transport
            .get_json(&endpoint.path(), &endpoint.query())
            .await
            .and_then(normalize::<T>);

        match result {
            Ok(payload) => {
                self.store_payload(key, payload.clone());
                self.resolve(key);
                Ok(payload)
            }
            Err(e) => {
                let e = Arc::new(e);
                self.record_failure(key, Arc::clone(&e));
                Err(e)
            }
        }
    }

    fn store_payload(&self, key: &str, payload: Value) {
        let now = self.clock.now();

        // Lock order: store, then cache. Holding the store lock from the
        // update through the write keeps snapshots on disk in update order.
        let Some(store) = &self.store else {
            lock(&self.cache).set(key, payload, now);
            return;
        };
        let store = lock(store);
        let entries = {
            let mut cache = lock(&self.cache);
            cache.set(key, payload, now);
            cache.entries()
        };
        if let Err(e) = store.save(&entries, now) {
            let path = store.path().display();
            warn!(path = %path, error = %e, "Failed to persist cache snapshot");
        }
    }

    fn record_failure(&self, key: &str, error: Arc<ShowcaseError>) {
        warn!(key, error = %error, "GitHub fetch failed, serving cached or placeholder data");
        if let Some(hook) = &self.error_hook {
            hook(&error);
        }
        let mut failures = lock(&self.failures);
        failures.retain(|(failed, _)| failed != key);
        failures.push((key.to_string(), error));
    }

    fn resolve(&self, key: &str) {
        lock(&self.failures).retain(|(failed, _)| failed != key);
    }
}

/// Decode `raw` as `T` and re-encode it, so only well-formed payloads
/// reach the cache.
fn normalize<T>(raw: Value) -> Result<Value>
where
    T: DeserializeOwned + Serialize,
{
    let typed: T = serde_json::from_value(raw)?;
    Ok(serde_json::to_value(&typed)?)
}
