//! Self-update support: polls the latest GitHub release, compares it with the
//! running version and supplies the metadata the host's installer needs.
//!
//! Failures never reach the end user. Internally every lookup is a
//! [`ReleaseLookup`] so callers and tests can tell "no release" from "the
//! request failed", while the public check collapses both to "no update".
//! Only successful lookups are cached; a failure is retried on the next call.

mod changelog;
mod install;
mod plugin;
mod release;
mod version;

use anyhow::Result;
use log::{debug, info, warn};
use md5::{Digest, Md5};
use std::time::Duration;

use crate::cache::{self, CacheStore};
use crate::http::{HttpClient, HttpRequest};

pub use changelog::format_changelog;
pub use install::{PLUGIN_SLUG_DIR, rename_extracted_directory};
pub use plugin::{PluginInfo, PluginSections, UpdateOffer};
pub use release::{DEFAULT_API_URL, ReleaseInfo, RepoId};
pub use version::{compare_versions, is_newer, version_from_tag};

/// Release metadata is cached for 12 hours.
pub const CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

const CACHE_KEY_PREFIX: &str = "weathercompact_github_update_";

/// Cache key for a repository's release metadata.
pub fn cache_key(repo: &RepoId) -> String {
    let digest = Md5::digest(repo.to_string().as_bytes());
    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(digest))
}

/// Why a release lookup produced nothing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("release request failed: {0}")]
    Transport(String),
    #[error("release API returned HTTP {0}")]
    Status(u16),
    #[error("release API returned an unreadable payload: {0}")]
    InvalidResponse(String),
}

/// Outcome of fetching release metadata.
#[derive(Debug, PartialEq, Eq)]
pub enum ReleaseLookup {
    Found(ReleaseInfo),
    /// The API answered but named no usable tag.
    NoRelease,
    Failed(LookupError),
}

impl ReleaseLookup {
    pub fn into_release(self) -> Option<ReleaseInfo> {
        match self {
            ReleaseLookup::Found(release) => Some(release),
            ReleaseLookup::NoRelease | ReleaseLookup::Failed(_) => None,
        }
    }
}

/// Result of comparing the running version with the latest release.
#[derive(Debug, PartialEq, Eq)]
pub enum UpdateStatus {
    Available(ReleaseInfo),
    UpToDate(ReleaseInfo),
    /// No release data, or the lookup failed.
    Unknown,
}

pub struct UpdateChecker<H, C> {
    http: H,
    cache: C,
    api_url: String,
    user_agent: String,
}

impl<H: HttpClient, C: CacheStore> UpdateChecker<H, C> {
    pub fn new(http: H, cache: C) -> Self {
        Self {
            http,
            cache,
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: crate::user_agent(),
        }
    }

    /// Points the checker at a different GitHub API (tests, GitHub Enterprise).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the latest release when it is strictly newer than `current_version`.
    pub async fn check_for_update(
        &self,
        current_version: &str,
        repo: &RepoId,
    ) -> Option<ReleaseInfo> {
        match self.check(current_version, repo).await {
            UpdateStatus::Available(release) => Some(release),
            UpdateStatus::UpToDate(_) | UpdateStatus::Unknown => None,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn check(&self, current_version: &str, repo: &RepoId) -> UpdateStatus {
        match self.get_release_metadata(repo).await {
            Some(release) if is_newer(current_version, &release.version) => {
                info!(
                    "Update available for {}: {} -> {}",
                    repo, current_version, release.version
                );
                UpdateStatus::Available(release)
            }
            Some(release) => {
                debug!(
                    "{} is up to date ({} >= {})",
                    repo, current_version, release.version
                );
                UpdateStatus::UpToDate(release)
            }
            None => UpdateStatus::Unknown,
        }
    }

    /// Manual "check now": drops the cached release first so the API is hit.
    pub async fn check_now(&self, current_version: &str, repo: &RepoId) -> UpdateStatus {
        if let Err(e) = self.clear_cache(repo) {
            warn!("Failed to clear release cache for {}: {:#}", repo, e);
        }
        self.check(current_version, repo).await
    }

    /// Returns cached release metadata, fetching it when absent or expired.
    pub async fn get_release_metadata(&self, repo: &RepoId) -> Option<ReleaseInfo> {
        self.lookup(repo).await.into_release()
    }

    /// Like [`Self::get_release_metadata`] but keeps the reason for a miss.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, repo: &RepoId) -> ReleaseLookup {
        let key = cache_key(repo);
        if let Some(release) = cache::get_json::<ReleaseInfo, _>(&self.cache, &key) {
            debug!("Using cached release {} for {}", release.version, repo);
            return ReleaseLookup::Found(release);
        }

        let lookup = self.fetch_latest(repo).await;
        match &lookup {
            ReleaseLookup::Found(release) => {
                if let Err(e) = cache::set_json(&self.cache, &key, release, CACHE_TTL) {
                    warn!("Failed to cache release metadata for {}: {:#}", repo, e);
                }
            }
            ReleaseLookup::NoRelease => debug!("No tagged release found for {}", repo),
            ReleaseLookup::Failed(e) => warn!("Update check for {} failed: {}", repo, e),
        }
        lookup
    }

    /// Deletes the cached release metadata for `repo`.
    pub fn clear_cache(&self, repo: &RepoId) -> Result<()> {
        debug!("Clearing release cache for {}", repo);
        self.cache.delete(&cache_key(repo))
    }

    /// Update-feed entry for the host, when a newer release exists.
    pub async fn update_offer(
        &self,
        current_version: &str,
        repo: &RepoId,
        slug: &str,
    ) -> Option<UpdateOffer> {
        self.check_for_update(current_version, repo)
            .await
            .map(|release| UpdateOffer::new(&release, slug))
    }

    /// Plugin details for the latest release, or `None` without release data.
    pub async fn plugin_information(&self, repo: &RepoId, slug: &str) -> Option<PluginInfo> {
        self.get_release_metadata(repo)
            .await
            .map(|release| PluginInfo::new(&release, repo, slug))
    }

    async fn fetch_latest(&self, repo: &RepoId) -> ReleaseLookup {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, repo.owner, repo.repo
        );
        debug!("Fetching latest release from {}...", url);

        let request = HttpRequest::new(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", &self.user_agent);

        let response = match self.http.get(&request).await {
            Ok(response) => response,
            Err(e) => return ReleaseLookup::Failed(LookupError::Transport(format!("{:#}", e))),
        };

        if !response.is_ok() {
            return ReleaseLookup::Failed(LookupError::Status(response.status));
        }

        match release::parse_latest_release(&response.body) {
            Ok(payload) => ReleaseInfo::from_api(payload)
                .map(ReleaseLookup::Found)
                .unwrap_or(ReleaseLookup::NoRelease),
            Err(e) => ReleaseLookup::Failed(LookupError::InvalidResponse(e.to_string())),
        }
    }
}
