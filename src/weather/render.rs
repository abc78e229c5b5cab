//! Widget markup.
//!
//! The output is a fixed structure the page script relies on: an outer
//! `weather-compact` element holding the icon, the one-line summary, the
//! toggle arrow and a hidden `weather-compact-detail` block.

use std::fmt::Write;

use super::WeatherSnapshot;
use crate::markup::escape_html;
use crate::settings::Settings;

pub const NOT_CONFIGURED_NOTICE: &str =
    r#"<span class="weather-compact-error">Weather: API key not configured</span>"#;
pub const UNAVAILABLE_NOTICE: &str =
    r#"<span class="weather-compact-error">Weather unavailable</span>"#;

const FALLBACK_ICON: &str = "🌡️";

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Icon for an OpenWeatherMap condition group; unknown groups get a thermometer.
pub fn condition_icon(condition_code: &str) -> &'static str {
    match condition_code {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Fog" | "Haze" | "Smoke" | "Dust" | "Sand" | "Ash" => "🌫️",
        "Squall" => "💨",
        "Tornado" => "🌪️",
        _ => FALLBACK_ICON,
    }
}

/// Nearest of the eight compass points, N at index 0, 45° per sector.
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    let sector = (degrees / 45.0).round() as i64;
    COMPASS_POINTS[sector.rem_euclid(8) as usize]
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn whole(value: f64) -> i64 {
    value.round() as i64
}

/// Renders a snapshot using the unit labels of the current settings.
pub fn render_snapshot(snapshot: &WeatherSnapshot, settings: &Settings) -> String {
    let temp_unit = settings.units.temperature_suffix();
    let speed_unit = settings.units.speed_suffix();

    let mut html = String::new();
    html.push_str(r#"<div class="weather-compact">"#);
    let _ = write!(
        html,
        r#"<span class="weather-compact-icon">{}</span>"#,
        condition_icon(&snapshot.condition_code)
    );
    let _ = write!(
        html,
        r#"<span class="weather-compact-summary">{}: {}{}, {}</span>"#,
        escape_html(&settings.location_name),
        whole(snapshot.temperature),
        temp_unit,
        escape_html(&capitalize_first(&snapshot.description))
    );
    html.push_str(r#"<span class="weather-compact-toggle">&#9660;</span>"#);

    html.push_str(r#"<div class="weather-compact-detail">"#);
    let _ = write!(
        html,
        "<div>Feels like: {}{}</div>",
        whole(snapshot.feels_like),
        temp_unit
    );
    let _ = write!(html, "<div>Humidity: {}%</div>", snapshot.humidity);
    let _ = write!(
        html,
        "<div>Wind: {} {} {}</div>",
        whole(snapshot.wind_speed),
        speed_unit,
        degrees_to_compass(snapshot.wind_degrees)
    );
    let _ = write!(html, "<div>Pressure: {} hPa</div>", snapshot.pressure_hpa);
    let _ = write!(
        html,
        "<div>Visibility: {} km</div>",
        whole(snapshot.visibility_meters / 1000.0)
    );
    let _ = write!(
        html,
        "<div>Sunrise: {} | Sunset: {}</div>",
        escape_html(&snapshot.sunrise),
        escape_html(&snapshot.sunset)
    );
    html.push_str("</div>");

    html.push_str("</div>");
    html
}
