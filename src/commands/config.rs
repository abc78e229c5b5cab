use anyhow::{Result, anyhow};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    VERSION,
    cache::FileCache,
    http::ReqwestClient,
    runtime::Runtime,
    settings::{Settings, default_settings_path},
    updater::{RepoId, UpdateChecker},
    weather::WeatherFetcher,
};

/// Repository the plugin's releases are published to.
pub const DEFAULT_REPO: &str = "nonatech-uk/wp-weather-compact";

/// Command-line overrides shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub settings_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub weather_api_url: Option<String>,
    pub github_api_url: Option<String>,
    pub repo: String,
    pub current_version: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings_path: None,
            cache_dir: None,
            weather_api_url: None,
            github_api_url: None,
            repo: DEFAULT_REPO.to_string(),
            current_version: VERSION.to_string(),
        }
    }
}

/// Services wired for one command invocation.
pub struct Config<H, C> {
    pub settings: Settings,
    pub repo: RepoId,
    pub current_version: String,
    pub weather: WeatherFetcher<H, C>,
    pub updater: UpdateChecker<H, C>,
}

impl<R: Runtime + Clone + 'static> Config<ReqwestClient, Arc<FileCache<R>>> {
    pub fn new(runtime: R, options: Options) -> Result<Self> {
        let repo = options.repo.parse::<RepoId>()?;

        let settings_path = match options.settings_path {
            Some(path) => path,
            None => default_settings_path(&runtime)?,
        };
        let settings = Settings::load(&runtime, &settings_path)?;

        let cache_dir = match options.cache_dir {
            Some(dir) => dir,
            None => default_cache_dir(&runtime)?,
        };
        debug!("Using settings {:?}, cache {:?}", settings_path, cache_dir);

        let http = ReqwestClient::with_user_agent(&crate::user_agent())?;
        let cache = Arc::new(FileCache::new(runtime.clone(), cache_dir));

        let mut weather = WeatherFetcher::new(http.clone(), cache.clone());
        if let Some(url) = options.weather_api_url {
            weather = weather.with_api_url(url);
        }
        let mut updater = UpdateChecker::new(http, cache);
        if let Some(url) = options.github_api_url {
            updater = updater.with_api_url(url);
        }

        Ok(Self {
            settings,
            repo,
            current_version: options.current_version,
            weather,
            updater,
        })
    }
}

/// `<cache dir>/weather-compact`
pub fn default_cache_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    runtime
        .cache_dir()
        .map(|dir| dir.join("weather-compact"))
        .ok_or_else(|| anyhow!("Could not determine a cache directory, pass --cache-dir"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::settings::Units;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_cache_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_cache_dir()
            .returning(|| Some(PathBuf::from("/home/user/.cache")));

        assert_eq!(
            default_cache_dir(&runtime).unwrap(),
            PathBuf::from("/home/user/.cache/weather-compact")
        );
    }

    #[test]
    fn test_default_cache_dir_unavailable() {
        let mut runtime = MockRuntime::new();
        runtime.expect_cache_dir().returning(|| None);

        assert!(default_cache_dir(&runtime).is_err());
    }

    #[test]
    fn test_config_new_loads_settings_and_overrides() {
        let dir = tempdir().unwrap();
        let settings_path = dir.path().join("settings.json");
        fs::write(
            &settings_path,
            r#"{"api_key": "k", "location_name": "Tring", "units": "imperial"}"#,
        )
        .unwrap();

        let options = Options {
            settings_path: Some(settings_path),
            cache_dir: Some(dir.path().join("cache")),
            github_api_url: Some("http://localhost:1/".into()),
            repo: "owner/repo".into(),
            current_version: "0.9.0".into(),
            ..Default::default()
        };
        let config = Config::new(RealRuntime, options).unwrap();

        assert_eq!(config.settings.location_name, "Tring");
        assert_eq!(config.settings.units, Units::Imperial);
        assert_eq!(config.repo.to_string(), "owner/repo");
        assert_eq!(config.current_version, "0.9.0");
        assert_eq!(config.updater.api_url(), "http://localhost:1");
        assert_eq!(config.weather.cache().dir(), dir.path().join("cache"));
    }

    #[test]
    fn test_config_new_rejects_bad_repo() {
        let dir = tempdir().unwrap();
        let options = Options {
            settings_path: Some(dir.path().join("missing.json")),
            cache_dir: Some(dir.path().to_path_buf()),
            repo: "not-a-repo".into(),
            ..Default::default()
        };

        assert!(Config::new(RealRuntime, options).is_err());
    }

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.repo, DEFAULT_REPO);
        assert_eq!(options.current_version, VERSION);
        assert!(options.settings_path.is_none());
    }
}
