//! Current conditions for the configured location, fetched from
//! OpenWeatherMap and cached for the configured duration.

mod api;
mod render;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cache::{self, CacheStore};
use crate::http::{HttpClient, HttpRequest};
use crate::settings::{Settings, Units};

pub use render::{
    NOT_CONFIGURED_NOTICE, UNAVAILABLE_NOTICE, condition_icon, degrees_to_compass,
    render_snapshot,
};

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org";

/// One global slot: there is a single configured location.
pub const CACHE_KEY: &str = "weather_compact_data";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("weather API key is not configured")]
    NotConfigured,
    #[error("weather request failed: {0}")]
    Transport(String),
    #[error("weather API returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Normalised current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure_hpa: f64,
    pub wind_speed: f64,
    pub wind_degrees: f64,
    pub visibility_meters: f64,
    pub condition_code: String,
    pub description: String,
    /// Local `HH:MM`, or `--:--` when unknown.
    pub sunrise: String,
    pub sunset: String,
    pub units: Units,
}

/// What is stored under [`CACHE_KEY`]. The request parameters travel with
/// the snapshot so a settings change is never answered from stale data.
#[derive(Debug, Serialize, Deserialize)]
struct CachedWeather {
    latitude: f64,
    longitude: f64,
    units: Units,
    snapshot: WeatherSnapshot,
}

impl CachedWeather {
    fn matches(&self, settings: &Settings) -> bool {
        self.latitude == settings.latitude
            && self.longitude == settings.longitude
            && self.units == settings.units
    }
}

pub struct WeatherFetcher<H, C> {
    http: H,
    cache: C,
    api_url: String,
}

impl<H: HttpClient, C: CacheStore> WeatherFetcher<H, C> {
    pub fn new(http: H, cache: C) -> Self {
        Self {
            http,
            cache,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Widget HTML for the current settings. Never fails: problems are
    /// logged and replaced by a short notice.
    pub async fn render(&self, settings: &Settings) -> String {
        match self.get_snapshot(settings).await {
            Ok(snapshot) => render_snapshot(&snapshot, settings),
            Err(FetchError::NotConfigured) => NOT_CONFIGURED_NOTICE.to_string(),
            Err(e) => {
                warn!("Weather unavailable for {}: {}", settings.location_name, e);
                UNAVAILABLE_NOTICE.to_string()
            }
        }
    }

    #[tracing::instrument(skip(self, settings), fields(location = %settings.location_name))]
    pub async fn get_snapshot(&self, settings: &Settings) -> Result<WeatherSnapshot, FetchError> {
        if !settings.is_configured() {
            return Err(FetchError::NotConfigured);
        }

        if let Some(cached) = cache::get_json::<CachedWeather, _>(&self.cache, CACHE_KEY) {
            if cached.matches(settings) {
                debug!("Using cached weather for {}", settings.location_name);
                return Ok(cached.snapshot);
            }
            debug!("Cached weather was fetched with different settings, refreshing");
        }

        let snapshot = self.fetch(settings).await?;

        let entry = CachedWeather {
            latitude: settings.latitude,
            longitude: settings.longitude,
            units: settings.units,
            snapshot,
        };
        if let Err(e) = cache::set_json(&self.cache, CACHE_KEY, &entry, settings.cache_ttl()) {
            warn!("Failed to cache weather data: {:#}", e);
        }
        Ok(entry.snapshot)
    }

    /// Drops the cached conditions, e.g. after settings are saved.
    pub fn clear_cache(&self) -> anyhow::Result<()> {
        self.cache.delete(CACHE_KEY)
    }

    async fn fetch(&self, settings: &Settings) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/data/2.5/weather", self.api_url);
        debug!(
            "Fetching weather for {},{} ({})",
            settings.latitude, settings.longitude, settings.units
        );

        let request = HttpRequest::new(url)
            .query("lat", settings.latitude)
            .query("lon", settings.longitude)
            .query("appid", settings.api_key.trim())
            .query("units", settings.units.as_str());

        let response = self
            .http
            .get(&request)
            .await
            .map_err(|e| FetchError::Transport(format!("{:#}", e)))?;

        if !response.is_ok() {
            debug!("Weather API answered HTTP {}", response.status);
        }
        api::parse_current(&response.body, settings.units)
    }
}
