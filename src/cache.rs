//! Populate-once, read-many tables keyed by language or database id.
//!
//! Each key owns its own slot guarded by a mutex: the first caller for a key runs
//! the loader while later callers for the *same* key block until it finishes.
//! Callers for other keys are not held up. A loader that fails leaves the slot
//! empty, so the next call starts a fresh load.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

#[derive(Debug)]
pub struct KeyedCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

// A panicking loader never stores a value, so a poisoned slot is still consistent.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K: Eq + Hash + Clone, V> KeyedCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &K) -> Slot<V> {
        lock(&self.slots).entry(key.clone()).or_default().clone()
    }

    /// Return the cached value for `key`, running `load` if it was never populated.
    pub fn get_or_try_load<E>(
        &self,
        key: &K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = self.slot(key);
        let mut guard = lock(&slot);
        if let Some(v) = guard.as_ref() {
            return Ok(Arc::clone(v));
        }
        let v = Arc::new(load()?);
        *guard = Some(Arc::clone(&v));
        Ok(v)
    }

    /// Cached value, or `None` when `key` was never populated.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = lock(&self.slots).get(key).cloned()?;
        let guard = lock(&slot);
        guard.clone()
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn loads_once_per_key() {
        let cache: KeyedCache<String, Vec<u32>> = KeyedCache::new();
        let calls = AtomicUsize::new(0);
        let load = || -> Result<Vec<u32>, ()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        };

        assert!(!cache.is_loaded(&"en".to_string()));
        let a = cache.get_or_try_load(&"en".to_string(), load).unwrap();
        let b = cache.get_or_try_load(&"en".to_string(), load).unwrap();
        assert!(a.is_empty());
        assert!(Arc::ptr_eq(&a, &b));
        // empty but initialized
        assert!(cache.is_loaded(&"en".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_or_try_load(&"fr".to_string(), load).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_load_leaves_slot_empty() {
        let cache: KeyedCache<u32, String> = KeyedCache::new();
        let err = cache.get_or_try_load(&2, || Err::<String, _>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.get(&2).is_none());

        let v = cache.get_or_try_load(&2, || Ok::<_, &str>("ok".to_string())).unwrap();
        assert_eq!(v.as_str(), "ok");
    }

    #[test]
    fn concurrent_first_callers_share_one_load() {
        let cache: KeyedCache<u32, u32> = KeyedCache::new();
        let calls = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let v = cache
                        .get_or_try_load(&1, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok::<_, ()>(42)
                        })
                        .unwrap();
                    assert_eq!(*v, 42);
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
