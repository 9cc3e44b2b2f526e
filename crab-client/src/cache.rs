//! Response cache
//!
//! Pure key/value interface, decoupled from request building: the HTTP
//! gateway only decides *what* the key is (the request URL) and when a
//! prefix becomes stale (after writes to a resource).

use dashmap::DashMap;

/// Key/value store for raw response bodies
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: String);

    /// Drop every entry whose key starts with `prefix`
    fn invalidate(&self, prefix: &str);
}

/// In-process cache backed by DashMap
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn put(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn invalidate(&self, prefix: &str) {
        self.entries.retain(|k, _| !k.starts_with(prefix));
    }
}
