//! Release metadata from the GitHub releases API.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::version::version_from_tag;

/// Default GitHub API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format. Expected 'owner/repo'.")
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// The latest published release, normalised for the update flow.
///
/// `version` is never empty: a release without a usable tag is treated as
/// "no release data" and never becomes a `ReleaseInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub version: String,
    /// Human-readable release page
    pub url: String,
    /// Source archive of the tagged tree
    pub download_url: String,
    /// Markdown release notes, possibly empty
    pub changelog_raw: String,
    /// ISO 8601 publication time, possibly empty
    pub released_at: String,
}

/// GitHub API response types (internal).
pub(super) mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct LatestRelease {
        pub tag_name: Option<String>,
        pub html_url: Option<String>,
        pub zipball_url: Option<String>,
        pub body: Option<String>,
        pub published_at: Option<String>,
    }
}

impl ReleaseInfo {
    /// Builds release info from an API payload; `None` when the tag is
    /// missing or reduces to an empty version.
    pub(super) fn from_api(release: api::LatestRelease) -> Option<Self> {
        let tag = release.tag_name?;
        let version = version_from_tag(&tag);
        if version.is_empty() {
            return None;
        }

        Some(ReleaseInfo {
            version: version.to_string(),
            url: release.html_url.unwrap_or_default(),
            download_url: release.zipball_url.unwrap_or_default(),
            changelog_raw: release.body.unwrap_or_default(),
            released_at: release.published_at.unwrap_or_default(),
        })
    }
}

/// Deserializes the `releases/latest` payload.
pub(super) fn parse_latest_release(body: &str) -> Result<api::LatestRelease, serde_json::Error> {
    serde_json::from_str(body)
}
