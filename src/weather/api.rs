//! OpenWeatherMap current-conditions payload.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use super::{FetchError, WeatherSnapshot};
use crate::settings::Units;

const DEFAULT_VISIBILITY_METERS: f64 = 10_000.0;
const UNKNOWN_TIME: &str = "--:--";

#[derive(Deserialize, Debug)]
struct CurrentWeather {
    main: Option<Main>,
    wind: Option<Wind>,
    visibility: Option<f64>,
    #[serde(default)]
    weather: Vec<Condition>,
    sys: Option<Sys>,
    /// Shift from UTC in seconds for the requested location.
    #[serde(default)]
    timezone: i32,
}

#[derive(Deserialize, Debug)]
struct Main {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize, Debug)]
struct Wind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Condition {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Sys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

/// Normalises a response body into a snapshot.
pub(super) fn parse_current(body: &str, units: Units) -> Result<WeatherSnapshot, FetchError> {
    let payload: CurrentWeather = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(format!("malformed payload: {}", e)))?;

    let main = payload
        .main
        .ok_or_else(|| FetchError::InvalidResponse("missing \"main\" section".to_string()))?;

    let (wind_speed, wind_degrees) = payload
        .wind
        .map(|w| (w.speed.unwrap_or(0.0), w.deg.unwrap_or(0.0)))
        .unwrap_or((0.0, 0.0));

    let condition = payload.weather.into_iter().next();
    let (condition_code, description) = match condition {
        Some(c) => (
            c.main.unwrap_or_else(|| "Clear".to_string()),
            c.description.unwrap_or_else(|| "clear sky".to_string()),
        ),
        None => ("Clear".to_string(), "clear sky".to_string()),
    };

    let (sunrise, sunset) = match payload.sys {
        Some(sys) => (
            local_clock(sys.sunrise, payload.timezone),
            local_clock(sys.sunset, payload.timezone),
        ),
        None => (UNKNOWN_TIME.to_string(), UNKNOWN_TIME.to_string()),
    };

    Ok(WeatherSnapshot {
        temperature: main.temp,
        feels_like: main.feels_like,
        humidity: main.humidity,
        pressure_hpa: main.pressure,
        wind_speed,
        wind_degrees,
        visibility_meters: payload.visibility.unwrap_or(DEFAULT_VISIBILITY_METERS),
        condition_code,
        description,
        sunrise,
        sunset,
        units,
    })
}

/// Formats a unix timestamp as `HH:MM` at the location's UTC offset.
fn local_clock(epoch: Option<i64>, offset_secs: i32) -> String {
    let offset = FixedOffset::east_opt(offset_secs)
        .or_else(|| FixedOffset::east_opt(0));
    match (epoch.and_then(|secs| DateTime::from_timestamp(secs, 0)), offset) {
        (Some(utc), Some(offset)) => utc.with_timezone(&offset).format("%H:%M").to_string(),
        _ => UNKNOWN_TIME.to_string(),
    }
}
