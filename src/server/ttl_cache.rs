//! Small in-memory TTL cache, used to memoize image URL liveness probes so
//! repeated edits of the same record don't re-fetch the same remote URL.

use reqwest::Client;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((inserted, value)) if inserted.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap();
        // Opportunistic sweep to keep the map from growing unbounded.
        entries.retain(|_, (inserted, _)| inserted.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), value));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Checks whether remote image URLs answer at all, with cached verdicts.
pub struct UrlProber {
    client: Client,
    cache: TtlCache<String, bool>,
}

impl UrlProber {
    pub fn new(ttl: Duration) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        UrlProber {
            client,
            cache: TtlCache::new(ttl),
        }
    }

    /// True when the URL answers with a success status. Network errors count
    /// as dead but are only cached like any other verdict, so a flaky host
    /// gets retried after the TTL.
    pub async fn is_alive(&self, url: &str) -> bool {
        let key = url.to_string();
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }
        let alive = match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("URL probe failed for {}: {}", url, err);
                false
            }
        };
        self.cache.put(key, alive);
        alive
    }
}

impl Default for UrlProber {
    fn default() -> Self {
        UrlProber::new(Duration::from_secs(600))
    }
}
