//! Insertion-ordered cache with optional TTL and size-bounded eviction.
//!
//! One abstraction backs all three process caches (scan results, thumbnails,
//! file properties). Eviction is strictly oldest-insertion-first, never LRU:
//! reads do not reorder entries, and replacing an existing key keeps its
//! original queue position. Time is passed in by the caller so expiry is
//! testable without sleeping.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    order: VecDeque<K>,
    ttl: Option<Duration>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    /// `ttl = None` disables per-read expiry (the caches that only bound size).
    #[must_use]
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fresh hit or nothing; an expired entry is dropped on the way out.
    pub fn get(&mut self, key: &K, now: Instant) -> Option<&V> {
        let expired = match self.entries.get(key) {
            Some(entry) => self
                .ttl
                .is_some_and(|ttl| now.duration_since(entry.inserted_at) >= ttl),
            None => return None,
        };
        if expired {
            self.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Insert `value`, evicting the single oldest-inserted entry if the cache
    /// would otherwise exceed capacity. Replacing an existing key keeps the
    /// key's original insertion position but refreshes its timestamp.
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        let entry = CacheEntry {
            value,
            inserted_at: now,
        };
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push_back(key);
        }
        if self.entries.len() > self.capacity {
            self.evict_oldest(1);
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key)?;
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        Some(removed.value)
    }

    /// Drop up to `n` entries in insertion order; returns how many went.
    pub fn evict_oldest(&mut self, n: usize) -> usize {
        let mut evicted = 0;
        while evicted < n {
            let Some(key) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&key);
            evicted += 1;
        }
        evicted
    }

    /// Drop every entry older than `max_age`, independent of the per-read TTL.
    pub fn sweep_expired(&mut self, now: Instant, max_age: Duration) -> usize {
        let stale: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.inserted_at) >= max_age)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            self.remove(key);
        }
        stale.len()
    }

    /// Keep only entries for which `keep` returns true; returns the number
    /// removed. This is how invalidation scans entry contents.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) -> usize {
        let doomed: Vec<K> = self
            .entries
            .iter()
            .filter(|(key, entry)| !keep(key, &entry.value))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }

    #[cfg(test)]
    fn oldest_key(&self) -> Option<&K> {
        self.order.front()
    }
}
