//! Records handed to the host's update feed and plugin-details popup.

use serde::Serialize;

use super::changelog::format_changelog;
use super::{ReleaseInfo, RepoId};

pub const PLUGIN_NAME: &str = "Weather Compact";
pub const PLUGIN_AUTHOR: &str = r#"<a href="https://nonatech.co.uk">NonaTech Services Ltd</a>"#;
pub const PLUGIN_DESCRIPTION: &str =
    "Compact one-line weather display with click-to-expand detail.";
const REQUIRES_HOST: &str = "5.0";
const REQUIRES_PHP: &str = "7.0";

/// Entry added to the host's pending-updates list when a newer release exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOffer {
    pub slug: String,
    pub plugin: String,
    pub new_version: String,
    pub url: String,
    pub package: String,
    pub requires_php: String,
}

impl UpdateOffer {
    pub fn new(release: &ReleaseInfo, slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            plugin: format!("{}/{}.php", slug, slug),
            new_version: release.version.clone(),
            url: release.url.clone(),
            package: release.download_url.clone(),
            requires_php: REQUIRES_PHP.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSections {
    pub description: String,
    pub changelog: String,
}

/// Details shown when an administrator opens the update's "view details" dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub author: String,
    pub homepage: String,
    pub download_link: String,
    pub sections: PluginSections,
    pub requires: String,
    pub requires_php: String,
    pub last_updated: String,
}

impl PluginInfo {
    pub fn new(release: &ReleaseInfo, repo: &RepoId, slug: &str) -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            slug: slug.to_string(),
            version: release.version.clone(),
            author: PLUGIN_AUTHOR.to_string(),
            homepage: format!("https://github.com/{}", repo),
            download_link: release.download_url.clone(),
            sections: PluginSections {
                description: PLUGIN_DESCRIPTION.to_string(),
                changelog: format_changelog(&release.changelog_raw, repo),
            },
            requires: REQUIRES_HOST.to_string(),
            requires_php: REQUIRES_PHP.to_string(),
            last_updated: release.released_at.clone(),
        }
    }
}
