//! Generic load-deduplicating cache

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// Keyed store of shared decoded assets
///
/// Loading only happens on a miss; a failed load leaves no entry behind, so
/// the next request retries.
pub struct ResourceCache<K, V> {
    entries: HashMap<K, Rc<V>>,
    kind: &'static str,
}

impl<K: Eq + Hash + Debug, V> ResourceCache<K, V> {
    /// Create an empty cache; `kind` names the asset type in log output
    pub fn new(kind: &'static str) -> Self {
        Self {
            entries: HashMap::new(),
            kind,
        }
    }

    /// Return the cached value for `key`, loading and caching it on a miss
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<Rc<V>, E> {
        if let Some(value) = self.entries.get(&key) {
            log::trace!("{} cache hit: {:?}", self.kind, key);
            return Ok(Rc::clone(value));
        }

        log::debug!("{} cache miss, loading {:?}", self.kind, key);
        let value = Rc::new(load()?);
        self.entries.insert(key, Rc::clone(&value));
        Ok(value)
    }

    /// Cached value without loading
    pub fn get(&self, key: &K) -> Option<Rc<V>> {
        self.entries.get(key).map(Rc::clone)
    }

    /// Whether `key` is cached
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, yielding the values for release
    pub fn drain(&mut self) -> impl Iterator<Item = Rc<V>> + '_ {
        self.entries.drain().map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_request_reuses_instance() {
        let mut cache = ResourceCache::new("test");
        let mut loads = 0;

        let first = cache
            .get_or_try_insert_with("a", || -> Result<_, ()> {
                loads += 1;
                Ok(String::from("decoded"))
            })
            .unwrap();
        let second = cache
            .get_or_try_insert_with("a", || -> Result<_, ()> {
                loads += 1;
                Ok(String::from("decoded again"))
            })
            .unwrap();

        assert_eq!(loads, 1);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache: ResourceCache<&str, u32> = ResourceCache::new("test");

        assert!(cache.get_or_try_insert_with("a", || Err("boom")).is_err());
        assert!(!cache.contains(&"a"));

        let value = cache.get_or_try_insert_with("a", || Ok::<_, &str>(7)).unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn test_drain_empties_cache() {
        let mut cache = ResourceCache::new("test");
        cache.get_or_try_insert_with(1, || Ok::<_, ()>("one")).unwrap();
        cache.get_or_try_insert_with(2, || Ok::<_, ()>("two")).unwrap();

        assert_eq!(cache.drain().count(), 2);
        assert!(cache.is_empty());
    }
}
