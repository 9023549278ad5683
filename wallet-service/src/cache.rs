use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry {
    expires_at: Instant,
    value: serde_json::Value,
}

/// In-process `key -> (expiry, value)` map with lazy eviction: expired
/// entries are dropped on access, never swept in the background.
pub struct Cache {
    store: Mutex<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl Cache {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut store = self.store.lock().await;
        match store.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                serde_json::from_value(entry.value.clone()).ok()
            }
            Some(_) => {
                store.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        self.store.lock().await.insert(
            key.to_string(),
            Entry { expires_at, value },
        );
    }

    pub async fn delete(&self, key: &str) {
        self.store.lock().await.remove(key);
    }
}
