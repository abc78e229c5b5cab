use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::CacheStore;

/// Value and expiry; `None` when the TTL reaches past what `Instant` can hold.
type Entry = (String, Option<Instant>);

/// In-process cache. Entries live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panicked writer cannot leave a half-written entry behind.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some((value, expires_at)) if expires_at.is_none_or(|at| Instant::now() < at) => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}
