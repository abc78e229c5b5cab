use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

const WEATHER_BODY: &str = r#"{
    "main": {"temp": 15.4, "feels_like": 14.1, "humidity": 80, "pressure": 1012},
    "wind": {"speed": 3.2, "deg": 90},
    "visibility": 9000,
    "weather": [{"main": "Rain", "description": "light rain"}],
    "sys": {"sunrise": 1700000000, "sunset": 1700030000}
}"#;

const RELEASE_BODY: &str = r#"{
    "tag_name": "v1.0.10",
    "html_url": "https://github.com/owner/repo/releases/tag/v1.0.10",
    "zipball_url": "https://api.github.com/repos/owner/repo/zipball/v1.0.10",
    "body": "- Fix wind direction",
    "published_at": "2024-05-01T10:00:00Z"
}"#;

/// Command with isolated settings and cache, and no API key from the host environment.
fn command(workdir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("weather-compact"));
    cmd.env_remove("WEATHER_COMPACT_API_KEY")
        .env_remove("WEATHER_COMPACT_CURRENT_VERSION")
        .arg("--settings")
        .arg(workdir.join("settings.json"))
        .arg("--cache-dir")
        .arg(workdir.join("cache"));
    cmd
}

fn write_settings(workdir: &Path, json: &str) {
    std::fs::write(workdir.join("settings.json"), json).unwrap();
}

#[test]
fn test_render_end_to_end() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "51.8614".into()),
            Matcher::UrlEncoded("lon".into(), "-0.6833".into()),
            Matcher::UrlEncoded("appid".into(), "test-key".into()),
            Matcher::UrlEncoded("units".into(), "metric".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(WEATHER_BODY)
        // the second run is served from the file cache
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    write_settings(dir.path(), r#"{"api_key": "test-key"}"#);

    for _ in 0..2 {
        command(dir.path())
            .arg("--weather-api-url")
            .arg(server.url())
            .arg("render")
            .assert()
            .success()
            .stdout(predicate::str::contains("Albury: 15°C, Light rain"))
            .stdout(predicate::str::contains("Wind: 3 m/s E"))
            .stdout(predicate::str::contains("Sunrise: 22:13 | Sunset: 06:33"));
    }

    mock.assert();
}

#[test]
fn test_render_api_key_from_environment() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::UrlEncoded("appid".into(), "env-key".into()))
        .with_status(200)
        .with_body(WEATHER_BODY)
        .create();

    let dir = tempdir().unwrap();

    command(dir.path())
        .env("WEATHER_COMPACT_API_KEY", "env-key")
        .arg("--weather-api-url")
        .arg(server.url())
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("weather-compact-summary"));

    mock.assert();
}

#[test]
fn test_render_without_api_key() {
    let dir = tempdir().unwrap();

    command(dir.path())
        .arg("--weather-api-url")
        .arg("http://127.0.0.1:9")
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weather: API key not configured"));
}

#[test]
fn test_render_api_failure_shows_notice() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"cod": 401, "message": "Invalid API key"}"#)
        .create();

    let dir = tempdir().unwrap();
    write_settings(dir.path(), r#"{"api_key": "bad-key"}"#);

    command(dir.path())
        .arg("--weather-api-url")
        .arg(server.url())
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weather unavailable"));
}

#[test]
fn test_check_update_offers_newer_release() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/repos/owner/repo/releases/latest")
        .match_header("User-Agent", Matcher::Regex("^weather-compact/".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(RELEASE_BODY)
        .expect(1)
        .create();

    let dir = tempdir().unwrap();

    for _ in 0..2 {
        command(dir.path())
            .args(["--github-api-url", &server.url()])
            .args(["--repo", "owner/repo", "--current-version", "1.0.9"])
            .arg("check-update")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""new_version": "1.0.10""#))
            .stdout(predicate::str::contains(
                r#""package": "https://api.github.com/repos/owner/repo/zipball/v1.0.10""#,
            ));
    }

    mock.assert();
}

#[test]
fn test_check_update_force_bypasses_cache() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/repos/owner/repo/releases/latest")
        .with_status(200)
        .with_body(RELEASE_BODY)
        .expect(2)
        .create();

    let dir = tempdir().unwrap();

    command(dir.path())
        .args(["--github-api-url", &server.url()])
        .args(["--repo", "owner/repo", "--current-version", "1.0.10"])
        .arg("check-update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));

    command(dir.path())
        .args(["--github-api-url", &server.url()])
        .args(["--repo", "owner/repo", "--current-version", "1.0.10"])
        .args(["check-update", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));

    mock.assert();
}

#[test]
fn test_check_update_failure_is_silent() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/repos/owner/repo/releases/latest")
        .with_status(500)
        .create();

    let dir = tempdir().unwrap();

    command(dir.path())
        .args(["--github-api-url", &server.url()])
        .args(["--repo", "owner/repo", "--current-version", "1.0.0"])
        .arg("check-update")
        .assert()
        .success()
        .stdout(predicate::str::contains("No release information available."));
}

#[test]
fn test_info_prints_plugin_details() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/repos/owner/repo/releases/latest")
        .with_status(200)
        .with_body(RELEASE_BODY)
        .create();

    let dir = tempdir().unwrap();

    command(dir.path())
        .args(["--github-api-url", &server.url()])
        .args(["--repo", "owner/repo"])
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "Weather Compact""#))
        .stdout(predicate::str::contains(r#""homepage": "https://github.com/owner/repo""#))
        .stdout(predicate::str::contains("<li>Fix wind direction</li>"));
}

#[test]
fn test_fix_dir_renames_extracted_directory() {
    let dir = tempdir().unwrap();
    let extracted = dir.path().join("owner-repo-1a2b3c4");
    std::fs::create_dir(&extracted).unwrap();
    std::fs::write(extracted.join("weather-compact.php"), "<?php").unwrap();

    command(dir.path())
        .arg("fix-dir")
        .arg(&extracted)
        .assert()
        .success()
        .stdout(predicate::str::contains("weather-compact"));

    assert!(dir.path().join("weather-compact/weather-compact.php").exists());
    assert!(!extracted.exists());
}

#[test]
fn test_fix_dir_refuses_existing_destination() {
    let dir = tempdir().unwrap();
    let extracted = dir.path().join("owner-repo-1a2b3c4");
    std::fs::create_dir(&extracted).unwrap();
    std::fs::create_dir(dir.path().join("weather-compact")).unwrap();

    command(dir.path())
        .arg("fix-dir")
        .arg(&extracted)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert!(extracted.exists());
}

#[test]
fn test_invalid_settings_file_fails() {
    let dir = tempdir().unwrap();
    write_settings(dir.path(), "{not json");

    command(dir.path())
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse settings file"));
}
