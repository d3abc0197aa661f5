//! In-memory caching layer for frequently accessed data

use fabula_core::CaseBox;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cached snapshot with expiration
struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Thread-safe cache for the user's case list with TTL
///
/// The case list is small and always fetched whole, so the cache holds
/// a single snapshot rather than per-entry records. Opening a case
/// changes ownership counts, which drops the snapshot.
pub struct CaseCache {
    cases: RwLock<Option<CacheEntry<Vec<CaseBox>>>>,
    default_ttl: Duration,
}

impl CaseCache {
    /// Create a new cache with the given TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cases: RwLock::new(None),
            default_ttl,
        }
    }

    /// Get the cached case list if not expired
    pub fn snapshot(&self) -> Option<Vec<CaseBox>> {
        let cache = self.cases.read().ok()?;
        let entry = cache.as_ref()?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    /// Get a single case by id from the cached snapshot
    pub fn get(&self, case_id: &str) -> Option<CaseBox> {
        self.snapshot()?.into_iter().find(|c| c.id == case_id)
    }

    /// Replace the cached snapshot
    pub fn store(&self, cases: Vec<CaseBox>) {
        if let Ok(mut cache) = self.cases.write() {
            *cache = Some(CacheEntry {
                value: cases,
                inserted_at: Instant::now(),
                ttl: self.default_ttl,
            });
        }
    }

    /// Drop the snapshot (e.g., after opening a case changes counts)
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cases.write() {
            *cache = None;
        }
    }

    /// Check if a fresh snapshot is available
    pub fn is_fresh(&self) -> bool {
        self.cases
            .read()
            .map(|c| c.as_ref().is_some_and(|e| !e.is_expired()))
            .unwrap_or(false)
    }
}

impl Default for CaseCache {
    fn default() -> Self {
        // Case counts only change through this client, 60s is plenty
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::i18n::LocalizedText;

    fn sample_case(id: &str) -> CaseBox {
        CaseBox {
            id: id.to_string(),
            name: LocalizedText {
                ru: "Кейс".to_string(),
                en: "Case".to_string(),
            },
            description: None,
            media_url: None,
            count: 1,
        }
    }

    #[test]
    fn test_store_and_snapshot() {
        let cache = CaseCache::new(Duration::from_secs(60));
        assert!(cache.snapshot().is_none());

        cache.store(vec![sample_case("common"), sample_case("rare")]);
        let snapshot = cache.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(cache.get("rare").unwrap().id, "rare");
        assert!(cache.get("mythic").is_none());
    }

    #[test]
    fn test_invalidate_drops_snapshot() {
        let cache = CaseCache::new(Duration::from_secs(60));
        cache.store(vec![sample_case("common")]);
        assert!(cache.is_fresh());

        cache.invalidate();
        assert!(!cache.is_fresh());
        assert!(cache.snapshot().is_none());
    }

    #[test]
    fn test_expired_snapshot_not_served() {
        let cache = CaseCache::new(Duration::ZERO);
        cache.store(vec![sample_case("common")]);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.snapshot().is_none());
    }
}
