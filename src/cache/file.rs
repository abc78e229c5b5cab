use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::CacheStore;
use crate::runtime::Runtime;

/// On-disk layout of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    /// Unix timestamp (seconds) after which the entry is stale.
    expires_at: u64,
    value: String,
}

/// Cache that keeps one JSON file per key under a directory, so entries
/// survive between invocations of the binary.
#[derive(Debug, Clone)]
pub struct FileCache<R: Runtime> {
    runtime: R,
    dir: PathBuf,
}

impl<R: Runtime> FileCache<R> {
    pub fn new(runtime: R, dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// One file per key. `[A-Za-z0-9_-]` is kept as is and every other byte
    /// is written as `%XX`, so distinct keys never share a file.
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file_name.push(char::from(byte));
            } else {
                let _ = write!(file_name, "%{:02X}", byte);
            }
        }
        self.dir.join(format!("{}.json", file_name))
    }

    fn read_entry(&self, path: &Path) -> Result<StoredEntry> {
        let content = self.runtime.read_to_string(path)?;
        let entry = serde_json::from_str(&content).context("Failed to parse cache entry")?;
        Ok(entry)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl<R: Runtime> CacheStore for FileCache<R> {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        if !self.runtime.exists(&path) {
            return None;
        }

        let entry = match self.read_entry(&path) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Unreadable cache file {:?}: {:#}", path, e);
                return None;
            }
        };

        if now_secs() >= entry.expires_at {
            debug!("Cache entry {} expired", key);
            if let Err(e) = self.runtime.remove_file(&path) {
                debug!("Failed to remove expired cache file {:?}: {:#}", path, e);
            }
            return None;
        }

        Some(entry.value)
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let path = self.entry_path(key);
        let entry = StoredEntry {
            expires_at: now_secs().saturating_add(ttl.as_secs()),
            value: value.to_string(),
        };
        let json = serde_json::to_string(&entry).context("Failed to serialize cache entry")?;

        self.runtime
            .create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {:?}", self.dir))?;

        // Write to a temp file and rename so readers never see a partial entry
        let tmp_path = path.with_extension("json.tmp");
        self.runtime.write(&tmp_path, json.as_bytes())?;
        self.runtime
            .rename(&tmp_path, &path)
            .with_context(|| format!("Failed to store cache entry {:?}", path))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if self.runtime.exists(&path) {
            self.runtime
                .remove_file(&path)
                .with_context(|| format!("Failed to delete cache entry {:?}", path))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::{always, eq};
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(RealRuntime, dir.path().join("cache"));

        cache.set("weather", "{\"t\":1}", Duration::from_secs(60)).unwrap();

        assert_eq!(cache.get("weather").as_deref(), Some("{\"t\":1}"));
        assert!(dir.path().join("cache/weather.json").exists());
        assert!(!dir.path().join("cache/weather.json.tmp").exists());
    }

    #[test]
    fn test_missing_key() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(RealRuntime, dir.path());
        assert!(cache.get("nothing").is_none());
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(RealRuntime, dir.path());

        cache.set("short", "v", Duration::ZERO).unwrap();

        assert!(cache.get("short").is_none());
        assert!(!dir.path().join("short.json").exists());
    }

    #[test]
    fn test_delete_entry_and_missing_key() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(RealRuntime, dir.path());

        cache.set("k", "v", Duration::from_secs(60)).unwrap();
        cache.delete("k").unwrap();
        assert!(cache.get("k").is_none());

        cache.delete("k").unwrap();
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "garbage").unwrap();

        let cache = FileCache::new(RealRuntime, dir.path());
        assert!(cache.get("bad").is_none());
    }

    #[test]
    fn test_key_is_encoded_into_file_name() {
        let cache = FileCache::new(RealRuntime, "/cache");
        assert_eq!(
            cache.entry_path("weather_compact_data"),
            PathBuf::from("/cache/weather_compact_data.json")
        );
        assert_eq!(
            cache.entry_path("a/b c"),
            PathBuf::from("/cache/a%2Fb%20c.json")
        );
        assert_eq!(cache.entry_path("%"), PathBuf::from("/cache/%25.json"));
    }

    #[test]
    fn test_distinct_keys_do_not_share_a_file() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(RealRuntime, dir.path());

        cache.set("a/b", "slash", Duration::from_secs(60)).unwrap();
        cache.set("a_b", "underscore", Duration::from_secs(60)).unwrap();

        assert_ne!(cache.entry_path("a/b"), cache.entry_path("a_b"));
        assert_eq!(cache.get("a/b").as_deref(), Some("slash"));
        assert_eq!(cache.get("a_b").as_deref(), Some("underscore"));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(RealRuntime, dir.path());

        cache.set("forever", "v", Duration::MAX).unwrap();
        assert_eq!(cache.get("forever").as_deref(), Some("v"));
    }

    #[test]
    fn test_set_writes_temp_file_then_renames() {
        let mut runtime = MockRuntime::new();
        let mut seq = mockall::Sequence::new();

        runtime
            .expect_create_dir_all()
            .with(eq(PathBuf::from("/cache")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .with(eq(PathBuf::from("/cache/key.json.tmp")), always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .with(
                eq(PathBuf::from("/cache/key.json.tmp")),
                eq(PathBuf::from("/cache/key.json")),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let cache = FileCache::new(runtime, "/cache");
        cache.set("key", "value", Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_set_propagates_write_failure() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let cache = FileCache::new(runtime, "/cache");
        assert!(cache.set("key", "value", Duration::from_secs(10)).is_err());
    }
}
