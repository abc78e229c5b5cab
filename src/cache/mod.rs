//! Key-value cache with per-entry expiry.
//!
//! Both services only need `get`, `set` and `delete`; an expired entry reads
//! as absent. Values are stored as JSON strings through [`get_json`] and
//! [`set_json`].

mod file;
mod memory;

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub use file::FileCache;
pub use memory::MemoryCache;

#[cfg_attr(test, mockall::automock)]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// Reads and deserializes a cached value. Unreadable entries count as a miss.
pub fn get_json<T, C>(cache: &C, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    C: CacheStore + ?Sized,
{
    let raw = cache.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unreadable cache entry {}: {}", key, e);
            None
        }
    }
}

/// Serializes and stores a value.
pub fn set_json<T, C>(cache: &C, key: &str, value: &T, ttl: Duration) -> Result<()>
where
    T: Serialize,
    C: CacheStore + ?Sized,
{
    let raw = serde_json::to_string(value).context("Failed to serialize cache entry")?;
    cache.set(key, &raw, ttl)
}
