use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

/// Soft cap; one entry is evicted per insert once exceeded
pub const CACHE_CAPACITY: usize = 500;

/// How long a generated fact stays servable
pub const FACT_TTL_HOURS: i64 = 6;

#[derive(Debug, Clone)]
struct CachedFact {
    fact: String,
    expires_at: DateTime<Utc>,
}

/// Fact cache with a TTL per entry and FIFO eviction.
///
/// Expired entries are not swept; they read as misses until overwritten or
/// evicted. Eviction follows first insertion, not recency or expiry.
#[derive(Debug, Default)]
pub struct FactCache {
    entries: HashMap<String, CachedFact>,
    order: VecDeque<String>,
}

impl FactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Fact for `key` unless it expired at or before `now`.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.fact.as_str())
    }

    /// Store a fact that expires `FACT_TTL_HOURS` after `now`.
    ///
    /// Re-inserting an existing key refreshes it in place and keeps its
    /// original position in the eviction order.
    pub fn insert(&mut self, key: String, fact: String, now: DateTime<Utc>) {
        let entry = CachedFact {
            fact,
            expires_at: now + Duration::hours(FACT_TTL_HOURS),
        };

        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push_back(key);
        }

        if self.entries.len() > CACHE_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "evicted oldest fun fact");
            }
        }
    }
}
