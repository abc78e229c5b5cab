//! Post-extraction fix-up for release archives.
//!
//! GitHub source archives unpack into `<owner>-<repo>-<sha>/`. The host's
//! installer expects the plugin's own directory name, so the extracted
//! directory is renamed in place before installation continues.

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Directory name the plugin is installed under.
pub const PLUGIN_SLUG_DIR: &str = "weather-compact";

/// Renames `extracted` to `<parent>/<slug_dir>` and returns the final path.
/// Does nothing when the directory already has the expected name.
#[tracing::instrument(skip(runtime))]
pub fn rename_extracted_directory<R: Runtime>(
    runtime: &R,
    extracted: &Path,
    slug_dir: &str,
) -> Result<PathBuf> {
    if slug_dir.is_empty() || slug_dir.contains(['/', '\\']) {
        bail!("Invalid plugin directory name: {:?}", slug_dir);
    }

    let parent = extracted
        .parent()
        .ok_or_else(|| anyhow!("Extracted path {:?} has no parent directory", extracted))?;
    let target = parent.join(slug_dir);

    if extracted == target {
        debug!("Extracted directory {:?} already has the expected name", extracted);
        return Ok(target);
    }

    if !runtime.is_dir(extracted) {
        bail!("Extracted path {:?} is not a directory", extracted);
    }
    if runtime.exists(&target) {
        bail!(
            "Cannot rename {:?}: destination {:?} already exists",
            extracted,
            target
        );
    }

    info!("Renaming extracted directory {:?} to {:?}", extracted, target);
    runtime
        .rename(extracted, &target)
        .with_context(|| format!("Failed to rename {:?} to {:?}", extracted, target))?;

    Ok(target)
}
