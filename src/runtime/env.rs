//! Environment variables and well-known directories.

use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn config_dir_impl(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn cache_dir_impl(&self) -> Option<PathBuf> {
        dirs::cache_dir()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_env_and_dirs() {
        let runtime = RealRuntime;

        // PATH should exist on all systems
        assert!(runtime.env_var("PATH").is_ok());
        assert!(
            runtime
                .env_var("WEATHER_COMPACT_SURELY_UNSET_VARIABLE")
                .is_err()
        );

        // Directories may be missing in minimal containers, but must be absolute when present
        if let Some(dir) = runtime.config_dir() {
            assert!(dir.is_absolute());
        }
        if let Some(dir) = runtime.cache_dir() {
            assert!(dir.is_absolute());
        }
    }
}
