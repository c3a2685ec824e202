//! Bounded LRU cache with O(1) operations.
//!
//! A hash map over a slot vector threaded with an intrusive
//! doubly-linked recency list: `get` promotes in O(1), `put` evicts
//! the least-recently-used entry in O(1) when at capacity. The cache
//! never exceeds its configured capacity.

use std::collections::HashMap;
use std::hash::Hash;

/// Sentinel for "no slot".
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// A fixed-capacity least-recently-used cache.
///
/// Keys must be cheap to clone; values are moved in and out.
#[derive(Debug)]
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<usize>,
    /// Most recently used slot.
    head: usize,
    /// Least recently used slot.
    tail: usize,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LRU cache capacity must be non-zero");
        Self {
            map: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a key is resident. Does not affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up a key, promoting it to most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.map.get(key)?;
        self.promote(slot);
        self.slots[slot].as_ref().map(|s| &s.value)
    }

    /// Mutable lookup, promoting to most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = *self.map.get(key)?;
        self.promote(slot);
        self.slots[slot].as_mut().map(|s| &mut s.value)
    }

    /// Look up a key without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let slot = *self.map.get(key)?;
        self.slots[slot].as_ref().map(|s| &s.value)
    }

    /// Insert an entry, evicting the least-recently-used one if the
    /// cache is at capacity.
    ///
    /// Returns the evicted `(key, value)` pair, or `None` if nothing
    /// was evicted. Inserting an existing key replaces its value and
    /// promotes it without eviction.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.map.get(&key) {
            self.slots[slot].as_mut().expect("mapped slot occupied").value = value;
            self.promote(slot);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(Slot {
                    key: key.clone(),
                    value,
                    prev: NIL,
                    next: NIL,
                });
                slot
            }
            None => {
                self.slots.push(Some(Slot {
                    key: key.clone(),
                    value,
                    prev: NIL,
                    next: NIL,
                }));
                self.slots.len() - 1
            }
        };
        self.map.insert(key, slot);
        self.push_front(slot);

        debug_assert!(self.map.len() <= self.capacity);
        evicted
    }

    /// Remove an entry by key.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.map.remove(key)?;
        self.unlink(slot);
        self.free.push(slot);
        self.slots[slot].take().map(|s| s.value)
    }

    /// Remove and return the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let slot = self.tail;
        if slot == NIL {
            return None;
        }
        self.unlink(slot);
        self.free.push(slot);
        let entry = self.slots[slot].take().expect("tail slot occupied");
        self.map.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Iterate over values without affecting recency, in no
    /// particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|s| &mut s.value))
    }

    fn promote(&mut self, slot: usize) {
        if self.head == slot {
            return;
        }
        self.unlink(slot);
        self.push_front(slot);
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let s = self.slots[slot].as_mut().expect("slot occupied");
            s.prev = NIL;
            s.next = old_head;
        }
        if old_head != NIL {
            self.slots[old_head].as_mut().expect("head occupied").prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let s = self.slots[slot].as_ref().expect("slot occupied");
            (s.prev, s.next)
        };
        if prev != NIL {
            self.slots[prev].as_mut().expect("prev occupied").next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].as_mut().expect("next occupied").prev = prev;
        } else {
            self.tail = prev;
        }
        if let Some(s) = self.slots[slot].as_mut() {
            s.prev = NIL;
            s.next = NIL;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut cache = LruCache::new(4);
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut cache = LruCache::new(3);
        for i in 0..100 {
            cache.put(i, i * 10);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn evicts_least_recently_used() {
        // Capacity-3 cache with a known access sequence
        let mut cache = LruCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        // Touch "a" so "b" is now least recently used
        assert_eq!(cache.get(&"a"), Some(&1));

        let evicted = cache.put("d", 4);
        assert_eq!(evicted, Some(("b", 2)));

        assert!(cache.contains(&"a"));
        assert!(cache.contains(&"c"));
        assert!(cache.contains(&"d"));
        assert!(!cache.contains(&"b"));
    }

    #[test]
    fn put_existing_key_replaces_and_promotes() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        // Re-put "a": no eviction, "b" becomes LRU
        assert_eq!(cache.put("a", 10), None);
        assert_eq!(cache.len(), 2);

        let evicted = cache.put("c", 3);
        assert_eq!(evicted, Some(("b", 2)));
        assert_eq!(cache.get(&"a"), Some(&10));
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.peek(&"a"), Some(&1));

        // "a" is still LRU despite the peek
        let evicted = cache.put("c", 3);
        assert_eq!(evicted, Some(("a", 1)));
    }

    #[test]
    fn remove_frees_capacity() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.len(), 1);

        // Slot is reusable without eviction
        assert_eq!(cache.put("c", 3), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn pop_lru_in_order() {
        let mut cache = LruCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.pop_lru(), Some(("a", 1)));
        assert_eq!(cache.pop_lru(), Some(("b", 2)));
        assert_eq!(cache.pop_lru(), Some(("c", 3)));
        assert_eq!(cache.pop_lru(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn single_entry_cache() {
        let mut cache = LruCache::new(1);
        cache.put("a", 1);
        assert_eq!(cache.put("b", 2), Some(("a", 1)));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn zero_capacity_panics() {
        let _ = LruCache::<u32, u32>::new(0);
    }

    #[test]
    fn values_mut_visits_all_entries() {
        let mut cache = LruCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);

        for value in cache.values_mut() {
            *value += 100;
        }

        assert_eq!(cache.peek(&"a"), Some(&101));
        assert_eq!(cache.peek(&"b"), Some(&102));
    }
}
