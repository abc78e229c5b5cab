//! CLI commands. Each public command builds a [`Config`] from the command
//! line and prints its result; the `*_report` functions hold the logic and
//! return the text so they can be tested against mocked services.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::{
    cache::CacheStore,
    http::HttpClient,
    runtime::Runtime,
    updater::{PLUGIN_SLUG_DIR, UpdateOffer, UpdateStatus, rename_extracted_directory},
};

pub mod config;

pub use config::{Config, DEFAULT_REPO, Options};

pub const NO_RELEASE_NOTICE: &str = "No release information available.";

/// Print the widget markup for the configured location.
#[tracing::instrument(skip(runtime, options))]
pub async fn render<R: Runtime + Clone + 'static>(runtime: R, options: Options) -> Result<()> {
    let config = Config::new(runtime, options)?;
    println!("{}", render_report(&config).await);
    Ok(())
}

pub async fn render_report<H: HttpClient, C: CacheStore>(config: &Config<H, C>) -> String {
    config.weather.render(&config.settings).await
}

/// Print the update offer, if any. `force` is the manual "check now".
#[tracing::instrument(skip(runtime, options))]
pub async fn check_update<R: Runtime + Clone + 'static>(
    runtime: R,
    options: Options,
    force: bool,
) -> Result<()> {
    let config = Config::new(runtime, options)?;
    println!("{}", check_update_report(&config, force).await?);
    Ok(())
}

pub async fn check_update_report<H: HttpClient, C: CacheStore>(
    config: &Config<H, C>,
    force: bool,
) -> Result<String> {
    let status = if force {
        config
            .updater
            .check_now(&config.current_version, &config.repo)
            .await
    } else {
        config
            .updater
            .check(&config.current_version, &config.repo)
            .await
    };

    Ok(match status {
        UpdateStatus::Available(release) => {
            serde_json::to_string_pretty(&UpdateOffer::new(&release, PLUGIN_SLUG_DIR))?
        }
        UpdateStatus::UpToDate(release) => format!(
            "Up to date: {} (latest release {})",
            config.current_version, release.version
        ),
        UpdateStatus::Unknown => NO_RELEASE_NOTICE.to_string(),
    })
}

/// Print the plugin details for the latest release.
#[tracing::instrument(skip(runtime, options))]
pub async fn info<R: Runtime + Clone + 'static>(runtime: R, options: Options) -> Result<()> {
    let config = Config::new(runtime, options)?;
    println!("{}", info_report(&config).await?);
    Ok(())
}

pub async fn info_report<H: HttpClient, C: CacheStore>(config: &Config<H, C>) -> Result<String> {
    match config
        .updater
        .plugin_information(&config.repo, PLUGIN_SLUG_DIR)
        .await
    {
        Some(info) => Ok(serde_json::to_string_pretty(&info)?),
        None => Ok(NO_RELEASE_NOTICE.to_string()),
    }
}

/// Rename an extracted release directory and print where it ended up.
#[tracing::instrument(skip(runtime))]
pub fn fix_dir<R: Runtime>(runtime: R, extracted: &Path, slug: Option<&str>) -> Result<()> {
    let target = fix_dir_report(&runtime, extracted, slug)?;
    println!("{}", target.display());
    Ok(())
}

pub fn fix_dir_report<R: Runtime>(
    runtime: &R,
    extracted: &Path,
    slug: Option<&str>,
) -> Result<PathBuf> {
    let slug = slug.unwrap_or(PLUGIN_SLUG_DIR);
    debug!("Fixing extracted directory {:?} -> {}", extracted, slug);
    rename_extracted_directory(runtime, extracted, slug)
}
