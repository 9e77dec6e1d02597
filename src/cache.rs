//! Keyed read-through cache for parsed inputs.
//!
//! Entries live for the lifetime of the cache. There is no eviction;
//! `clear()` is the only invalidation. Failed loads are not cached, so a
//! file that appears later is picked up on the next request.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
pub struct KeyedCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Arc<V>>> {
        // A poisoned map still holds only fully inserted entries
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).cloned()
    }

    /// Return the cached value for `key`, loading and storing it on a miss.
    ///
    /// The lock is not held while `load` runs.
    pub fn get_or_try_load<E, F>(&self, key: &K, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = Arc::new(load()?);
        let mut entries = self.lock();
        let stored = entries.entry(key.clone()).or_insert(value);
        Ok(Arc::clone(stored))
    }

    /// Infallible form of `get_or_try_load`.
    pub fn get_or_load<F>(&self, key: &K, load: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.get_or_try_load(key, || Ok::<V, std::convert::Infallible>(load())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
