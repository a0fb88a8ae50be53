use std::time::{Duration, Instant};

/// Cached query results go stale after this window; a repeated request with
/// the same key inside it reuses the cached value instead of refetching.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Entries retained per query family before the oldest is evicted.
const MAX_ENTRIES: usize = 16;

/// Cache for one query family, keyed by that family's parameter tuple. Each
/// key holds the most recent result for it; storing a key again replaces its
/// entry, and the oldest entry is evicted once the family is full.
pub struct CachedQuery<K, V> {
    entries: Vec<CacheEntry<K, V>>,
}

struct CacheEntry<K, V> {
    key: K,
    fetched_at: Instant,
    value: V,
}

impl<K: PartialEq, V: Clone> CachedQuery<K, V> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn lookup(&self, key: &K, max_age: Duration) -> Option<V> {
        let entry = self.entries.iter().find(|entry| &entry.key == key)?;
        if entry.fetched_at.elapsed() < max_age {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn store(&mut self, key: K, value: V) {
        self.entries.retain(|entry| entry.key != key);
        if self.entries.len() == MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(CacheEntry {
            key,
            fetched_at: Instant::now(),
            value,
        });
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }
}

impl<K: PartialEq, V: Clone> Default for CachedQuery<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot queries are keyed by their node limit and minimum relevance
/// score. The score is held in hundredths so the key stays `Eq`-comparable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotKey {
    pub limit: usize,
    pub min_score_hundredths: u32,
}

impl SnapshotKey {
    pub fn new(limit: usize, min_score: f32) -> Self {
        Self {
            limit,
            min_score_hundredths: (min_score.clamp(0.0, 1.0) * 100.0).round() as u32,
        }
    }

    pub fn min_score(&self) -> f32 {
        self.min_score_hundredths as f32 / 100.0
    }
}
