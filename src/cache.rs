//! Process-wide memoization of table loads.
//!
//! The table is expensive to build and read-only afterwards, so the
//! calling layer keeps one cache entry per (source set, sample fraction,
//! seed) and shares the resulting [`Arc<TripTable>`] across sessions.
//! Caching lives here, outside the loader, which stays a pure function
//! of its inputs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::LoadError;
use crate::model::TripTable;

/// Identity of one cached load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    sources: Vec<PathBuf>,
    fraction_bits: u64,
    seed: Option<u64>,
}

impl CacheKey {
    /// Source order does not affect the logical dataset, so the key
    /// sorts it away.
    pub fn new(sources: &[PathBuf], sample_fraction: f64, seed: Option<u64>) -> Self {
        let mut sources = sources.to_vec();
        sources.sort();
        Self {
            sources,
            fraction_bits: sample_fraction.to_bits(),
            seed,
        }
    }
}

struct Entry {
    table: Arc<TripTable>,
    loaded_at: Instant,
}

type Slot = Arc<Mutex<Option<Entry>>>;

/// Memoized, single-flight table loads with optional expiry.
pub struct TableCache {
    ttl: Option<Duration>,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl TableCache {
    /// A cache whose entries live for `ttl`, or forever with `None`.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached table for `key`, running `loader` if the slot
    /// is empty or expired.
    ///
    /// Concurrent callers for the same key block on one in-flight load
    /// and share its published result; loads for different keys proceed
    /// independently. A failed load publishes nothing, so the next
    /// caller retries.
    ///
    /// # Errors
    ///
    /// Propagates the loader's [`LoadError`] unchanged.
    pub fn get_or_load<F>(&self, key: &CacheKey, loader: F) -> Result<Arc<TripTable>, LoadError>
    where
        F: FnOnce() -> Result<TripTable, LoadError>,
    {
        let slot = {
            let mut slots = self.slots.lock().expect("cache slot map poisoned");
            slots.entry(key.clone()).or_default().clone()
        };

        // Holding the slot for the duration of the load is what makes
        // duplicate loads for the same key collapse into one.
        let mut guard = slot.lock().expect("cache slot poisoned");

        if let Some(entry) = guard.as_ref() {
            let expired = self
                .ttl
                .is_some_and(|ttl| entry.loaded_at.elapsed() >= ttl);
            if !expired {
                debug!("Table cache hit");
                return Ok(Arc::clone(&entry.table));
            }
            debug!("Table cache entry expired");
        }

        let table = Arc::new(loader()?);
        *guard = Some(Entry {
            table: Arc::clone(&table),
            loaded_at: Instant::now(),
        });
        debug!("Table cache entry published");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn key(tag: &str) -> CacheKey {
        CacheKey::new(&[PathBuf::from(tag)], 1.0, Some(0))
    }

    fn empty_table() -> Result<TripTable, LoadError> {
        Ok(TripTable::default())
    }

    #[test]
    fn test_second_lookup_reuses_published_table() {
        let cache = TableCache::new(None);
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_load(&key("a"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                empty_table()
            })
            .unwrap();
        let second = cache
            .get_or_load(&key("a"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                empty_table()
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_keys_load_separately() {
        let cache = TableCache::new(None);
        let calls = AtomicUsize::new(0);

        for tag in ["a", "b"] {
            cache
                .get_or_load(&key(tag), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    empty_table()
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_key_ignores_source_order() {
        let forward = CacheKey::new(&[PathBuf::from("a"), PathBuf::from("b")], 0.4, Some(1));
        let reversed = CacheKey::new(&[PathBuf::from("b"), PathBuf::from("a")], 0.4, Some(1));
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_key_distinguishes_fraction_and_seed() {
        let sources = [PathBuf::from("a")];
        assert_ne!(
            CacheKey::new(&sources, 0.3, Some(1)),
            CacheKey::new(&sources, 0.4, Some(1))
        );
        assert_ne!(
            CacheKey::new(&sources, 0.3, Some(1)),
            CacheKey::new(&sources, 0.3, Some(2))
        );
    }

    #[test]
    fn test_failed_load_publishes_nothing_and_retries() {
        let cache = TableCache::new(None);

        let err = cache.get_or_load(&key("a"), || Err(LoadError::SampleFraction(0.0)));
        assert!(err.is_err());

        // slot stayed empty, so the next caller loads again
        let calls = AtomicUsize::new(0);
        cache
            .get_or_load(&key("a"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                empty_table()
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_entry_reloads() {
        let cache = TableCache::new(Some(Duration::from_millis(0)));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_load(&key("a"), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    empty_table()
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_lookups_collapse_to_one_load() {
        let cache = Arc::new(TableCache::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache
                        .get_or_load(&key("shared"), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            empty_table()
                        })
                        .unwrap()
                })
            })
            .collect();

        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
    }
}
