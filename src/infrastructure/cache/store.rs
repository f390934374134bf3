//! Keyed entity stores. One lock per store; readers get `Arc` snapshots.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn record<T>(&self, found: Option<T>) -> Option<T> {
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

/// Flat store keyed by a single id.
#[derive(Debug)]
pub struct EntityCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
    counters: Counters,
}

impl<K, V> Default for EntityCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }
}

impl<K, V> EntityCache<K, V>
where
    K: Eq + Hash + Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let found = self.entries.read().get(key).cloned();
        self.counters.record(found)
    }

    /// Stores `value`, replacing any previous entry, and returns the stored
    /// instance.
    pub fn set(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.write().insert(key, Arc::clone(&value));
        value
    }

    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.entries.write().remove(key)
    }

    /// Applies `f` to the cached entry in place. Readers holding the old
    /// snapshot keep seeing it.
    pub fn update<F>(&self, key: &K, f: F) -> Option<Arc<V>>
    where
        V: Clone,
        F: FnOnce(&mut V),
    {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(key)?;
        f(Arc::make_mut(entry));
        Some(Arc::clone(entry))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn all(&self) -> Vec<Arc<V>> {
        self.entries.read().values().cloned().collect()
    }

    /// Visits every entry under the read lock. `f` must not write to this store.
    pub fn for_all<F>(&self, mut f: F)
    where
        F: FnMut(&V),
    {
        for value in self.entries.read().values() {
            f(value);
        }
    }

    pub fn find_all<P>(&self, mut predicate: P) -> Vec<Arc<V>>
    where
        P: FnMut(&V) -> bool,
    {
        self.entries
            .read()
            .values()
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<Arc<V>>
    where
        P: FnMut(&V) -> bool,
    {
        self.entries
            .read()
            .values()
            .find(|value| predicate(value))
            .cloned()
    }

    /// Removes every entry matching `predicate` and returns how many went.
    pub fn remove_if<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&V) -> bool,
    {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, value| !predicate(value));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub(super) fn hit_miss(&self) -> (u64, u64) {
        self.counters.snapshot()
    }
}

/// Store partitioned by an owning id, e.g. members per guild.
#[derive(Debug)]
pub struct GroupedEntityCache<G, K, V> {
    groups: RwLock<HashMap<G, HashMap<K, Arc<V>>>>,
    counters: Counters,
}

impl<G, K, V> Default for GroupedEntityCache<G, K, V> {
    fn default() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }
}

impl<G, K, V> GroupedEntityCache<G, K, V>
where
    G: Eq + Hash + Copy,
    K: Eq + Hash + Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: G, key: K) -> Option<Arc<V>> {
        let found = self
            .groups
            .read()
            .get(&group)
            .and_then(|entries| entries.get(&key))
            .cloned();
        self.counters.record(found)
    }

    pub fn set(&self, group: G, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.groups
            .write()
            .entry(group)
            .or_default()
            .insert(key, Arc::clone(&value));
        value
    }

    pub fn remove(&self, group: G, key: K) -> Option<Arc<V>> {
        let mut groups = self.groups.write();
        let entries = groups.get_mut(&group)?;
        let removed = entries.remove(&key);
        if entries.is_empty() {
            groups.remove(&group);
        }
        removed
    }

    /// Drops a whole group and returns its entries.
    pub fn remove_group(&self, group: G) -> Vec<Arc<V>> {
        self.groups
            .write()
            .remove(&group)
            .map(|entries| entries.into_values().collect())
            .unwrap_or_default()
    }

    pub fn update<F>(&self, group: G, key: K, f: F) -> Option<Arc<V>>
    where
        V: Clone,
        F: FnOnce(&mut V),
    {
        let mut groups = self.groups.write();
        let entry = groups.get_mut(&group)?.get_mut(&key)?;
        f(Arc::make_mut(entry));
        Some(Arc::clone(entry))
    }

    /// Snapshot of one group.
    pub fn group_all(&self, group: G) -> Vec<Arc<V>> {
        self.groups
            .read()
            .get(&group)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Visits one group under the read lock.
    pub fn group_for_each<F>(&self, group: G, mut f: F)
    where
        F: FnMut(&V),
    {
        if let Some(entries) = self.groups.read().get(&group) {
            for value in entries.values() {
                f(value);
            }
        }
    }

    pub fn group_len(&self, group: G) -> usize {
        self.groups.read().get(&group).map_or(0, HashMap::len)
    }

    pub fn group_find_all<P>(&self, group: G, mut predicate: P) -> Vec<Arc<V>>
    where
        P: FnMut(&V) -> bool,
    {
        self.groups
            .read()
            .get(&group)
            .map(|entries| {
                entries
                    .values()
                    .filter(|value| predicate(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn for_all<F>(&self, mut f: F)
    where
        F: FnMut(&V),
    {
        for value in self.groups.read().values().flat_map(HashMap::values) {
            f(value);
        }
    }

    pub fn find_all<P>(&self, mut predicate: P) -> Vec<Arc<V>>
    where
        P: FnMut(&V) -> bool,
    {
        self.groups
            .read()
            .values()
            .flat_map(HashMap::values)
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<Arc<V>>
    where
        P: FnMut(&V) -> bool,
    {
        self.groups
            .read()
            .values()
            .flat_map(HashMap::values)
            .find(|value| predicate(value))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.groups.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.groups.write().clear();
    }

    pub(super) fn hit_miss(&self) -> (u64, u64) {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_and_is_idempotent() {
        let cache: EntityCache<u64, String> = EntityCache::new();

        let first = cache.set(1, "a".to_string());
        let second = cache.set(1, "a".to_string());
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.set(1, "b".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.get(&1).unwrap(), "b");
    }

    #[test]
    fn test_miss_is_none() {
        let cache: EntityCache<u64, String> = EntityCache::new();
        assert!(cache.get(&9).is_none());
        assert!(cache.remove(&9).is_none());
        assert_eq!(cache.hit_miss(), (0, 1));
    }

    #[test]
    fn test_update_leaves_old_snapshot_intact() {
        let cache: EntityCache<u64, Vec<u32>> = EntityCache::new();
        let before = cache.set(1, vec![1]);

        let after = cache.update(&1, |v| v.push(2)).unwrap();

        assert_eq!(*before, vec![1]);
        assert_eq!(*after, vec![1, 2]);
        assert_eq!(*cache.get(&1).unwrap(), vec![1, 2]);
        assert!(cache.update(&2, |v| v.push(3)).is_none());
    }

    #[test]
    fn test_find_and_remove_if() {
        let cache: EntityCache<u64, u32> = EntityCache::new();
        for i in 0..10 {
            cache.set(i, u32::try_from(i).unwrap());
        }

        assert_eq!(cache.find_all(|v| v % 2 == 0).len(), 5);
        assert_eq!(cache.find(|v| *v == 7).map(|v| *v), Some(7));
        assert_eq!(cache.remove_if(|v| *v >= 8), 2);
        assert_eq!(cache.len(), 8);

        let mut sum = 0;
        cache.for_all(|v| sum += v);
        assert_eq!(sum, 28);
    }

    #[test]
    fn test_grouped_isolation() {
        let cache: GroupedEntityCache<u64, u64, &str> = GroupedEntityCache::new();
        cache.set(1, 10, "a");
        cache.set(1, 11, "b");
        cache.set(2, 10, "c");

        assert_eq!(cache.get(1, 10).as_deref(), Some(&"a"));
        assert_eq!(cache.get(2, 10).as_deref(), Some(&"c"));
        assert_eq!(cache.group_len(1), 2);
        assert_eq!(cache.len(), 3);

        let mut seen = Vec::new();
        cache.group_for_each(1, |v| seen.push(*v));
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_grouped_remove_and_remove_group() {
        let cache: GroupedEntityCache<u64, u64, u32> = GroupedEntityCache::new();
        cache.set(1, 10, 1);
        cache.set(1, 11, 2);
        cache.set(2, 10, 3);

        assert_eq!(cache.remove(1, 10).as_deref(), Some(&1));
        assert_eq!(cache.remove_group(1).len(), 1);
        assert!(cache.group_all(1).is_empty());
        assert_eq!(cache.len(), 1);
        assert!(cache.remove_group(5).is_empty());
    }

    #[test]
    fn test_group_snapshot_is_detached() {
        let cache: GroupedEntityCache<u64, u64, u32> = GroupedEntityCache::new();
        cache.set(1, 10, 1);

        let snapshot = cache.group_all(1);
        cache.set(1, 11, 2);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(cache.group_all(1).len(), 2);
    }
}
