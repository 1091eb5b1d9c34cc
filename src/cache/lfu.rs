//! LFU Store Module
//!
//! Least-frequently-used store: a hash index into an arena of entries, plus
//! a binary min-heap of arena ids ordered by access frequency. Every entry
//! records its current heap position (`slot`), so an arbitrary key can be
//! removed in O(log n) without scanning the heap.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::stats::CacheStats;
use crate::cache::store::Store;

// == LFU Entry ==
/// An entry with its frequency counter and heap back-index.
#[derive(Debug)]
struct LfuEntry<K, V> {
    entry: CacheEntry<K, V>,
    /// Access count; starts at 1 and is bumped on every get or overwrite
    frequency: u64,
    /// Current position in the heap vector, maintained on every swap
    slot: usize,
}

// == LFU Store ==
/// Cache store evicting the least frequently used entry at capacity.
///
/// Tie-break among equal frequencies is whatever the heap yields; callers
/// must not rely on a specific victim.
#[derive(Debug)]
pub(crate) struct LfuStore<K, V> {
    /// Key -> arena id of the live entry
    index: HashMap<K, usize>,
    /// Entry arena; freed slots are `None` and recorded in `free`
    arena: Vec<Option<LfuEntry<K, V>>>,
    /// Arena ids available for reuse
    free: Vec<usize>,
    /// Min-heap of arena ids ordered by ascending frequency
    heap: Vec<usize>,
    max_entries: usize,
    default_ttl: Duration,
    stats: CacheStats,
}

impl<K, V> LfuStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty LFU store.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            index: HashMap::new(),
            arena: Vec::new(),
            free: Vec::new(),
            heap: Vec::new(),
            max_entries,
            default_ttl,
            stats: CacheStats::new(),
        }
    }

    fn entry(&self, id: usize) -> &LfuEntry<K, V> {
        self.arena[id]
            .as_ref()
            .expect("lfu index references a live arena entry")
    }

    fn entry_mut(&mut self, id: usize) -> &mut LfuEntry<K, V> {
        self.arena[id]
            .as_mut()
            .expect("lfu index references a live arena entry")
    }

    fn frequency_at(&self, pos: usize) -> u64 {
        self.entry(self.heap[pos]).frequency
    }

    fn allocate(&mut self, entry: LfuEntry<K, V>) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.arena[id] = Some(entry);
                id
            }
            None => {
                self.arena.push(Some(entry));
                self.arena.len() - 1
            }
        }
    }

    // == Heap Plumbing ==
    /// Swaps two heap positions, keeping both back-indices current.
    fn heap_swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        let id_a = self.heap[a];
        let id_b = self.heap[b];
        self.entry_mut(id_a).slot = a;
        self.entry_mut(id_b).slot = b;
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.frequency_at(pos) >= self.frequency_at(parent) {
                break;
            }
            self.heap_swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < self.heap.len() && self.frequency_at(right) < self.frequency_at(left) {
                smallest = right;
            }
            if self.frequency_at(pos) <= self.frequency_at(smallest) {
                break;
            }
            self.heap_swap(pos, smallest);
            pos = smallest;
        }
    }

    fn heap_push(&mut self, id: usize) {
        self.heap.push(id);
        let pos = self.heap.len() - 1;
        self.entry_mut(id).slot = pos;
        self.sift_up(pos);
    }

    /// Removes the heap element at `pos` by swapping in the last element and
    /// restoring the heap property in both directions.
    fn heap_remove(&mut self, pos: usize) {
        let last = self.heap.len() - 1;
        self.heap_swap(pos, last);
        self.heap.pop();
        if pos < self.heap.len() {
            self.sift_down(pos);
            self.sift_up(pos);
        }
    }

    /// Restores an entry's heap position after its frequency changed.
    fn heap_fix(&mut self, pos: usize) {
        self.sift_down(pos);
        self.sift_up(pos);
    }

    /// Removes an entry through its back-index, dropping it from the heap,
    /// the arena, and the hash index.
    fn remove_entry(&mut self, id: usize) {
        let slot = self.entry(id).slot;
        debug_assert_eq!(self.heap[slot], id, "stored slot disagrees with heap");
        self.heap_remove(slot);

        let entry = self.arena[id]
            .take()
            .expect("lfu index references a live arena entry");
        self.free.push(id);
        self.index.remove(&entry.entry.key);
    }

    /// Evicts the minimum-frequency entry at the heap root.
    fn evict(&mut self) {
        if self.heap.is_empty() {
            return;
        }
        self.remove_entry(self.heap[0]);
        self.stats.record_eviction();
        debug!("lfu eviction: dropped least frequently used entry");
    }

    // == Consistency Check ==
    /// Cross-checks index, arena, and heap, including every back-index and
    /// the heap ordering property.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let live = self.arena.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, self.index.len(), "arena/index size mismatch");
        assert_eq!(self.heap.len(), self.index.len(), "heap/index size mismatch");

        for (pos, &id) in self.heap.iter().enumerate() {
            let entry = self.entry(id);
            assert_eq!(entry.slot, pos, "entry slot disagrees with heap position");
            assert_eq!(
                self.index.get(&entry.entry.key).copied(),
                Some(id),
                "index does not point at the entry holding its key"
            );
            if pos > 0 {
                let parent = (pos - 1) / 2;
                assert!(
                    self.frequency_at(parent) <= self.frequency_at(pos),
                    "heap property violated"
                );
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn frequency_of(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|&id| self.entry(id).frequency)
    }
}

impl<K, V> Store<K, V> for LfuStore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);

        if let Some(&id) = self.index.get(&key) {
            // Overwrites bump frequency exactly like reads do
            let entry = self.entry_mut(id);
            entry.entry.refresh(value, ttl);
            entry.frequency += 1;
            let slot = entry.slot;
            self.heap_fix(slot);
            return;
        }

        let id = self.allocate(LfuEntry {
            entry: CacheEntry::new(key.clone(), value, ttl),
            frequency: 1,
            slot: 0,
        });
        self.heap_push(id);
        self.index.insert(key, id);

        // Insert first, evict after: size exceeds capacity by at most one
        // inside this call.
        if self.index.len() > self.max_entries {
            self.evict();
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.entry(id).entry.is_expired_at(Instant::now()) {
            self.remove_entry(id);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entry_mut(id);
        entry.frequency += 1;
        let slot = entry.slot;
        self.heap_fix(slot);

        self.stats.record_hit();
        Some(self.entry(id).entry.value.clone())
    }

    fn delete(&mut self, key: &K) -> bool {
        match self.index.get(key).copied() {
            Some(id) => {
                self.remove_entry(id);
                true
            }
            None => false,
        }
    }

    fn flush(&mut self) {
        self.index.clear();
        self.arena.clear();
        self.free.clear();
        self.heap.clear();
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<usize> = self
            .index
            .values()
            .copied()
            .filter(|&id| self.entry(id).entry.is_expired_at(now))
            .collect();

        let count = expired.len();
        for id in expired {
            self.remove_entry(id);
        }
        count
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.index.len();
        stats
    }
}
