//! LRU Store Module
//!
//! Least-recently-used store: a hash index into an arena of nodes threaded
//! onto a doubly-linked recency list. Head = most recently used, tail = next
//! eviction victim. Every operation is O(1).

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::stats::CacheStats;
use crate::cache::store::Store;

/// Sentinel arena index marking a missing neighbor.
const NIL: usize = usize::MAX;

// == List Node ==
/// An entry threaded into the recency list by arena index.
#[derive(Debug)]
struct Node<K, V> {
    entry: CacheEntry<K, V>,
    prev: usize,
    next: usize,
}

// == LRU Store ==
/// Cache store evicting the least recently used entry at capacity.
#[derive(Debug)]
pub(crate) struct LruStore<K, V> {
    /// Key -> arena index of the live node
    index: HashMap<K, usize>,
    /// Node arena; freed slots are `None` and recorded in `free`
    nodes: Vec<Option<Node<K, V>>>,
    /// Arena slots available for reuse
    free: Vec<usize>,
    /// Most recently used node, `NIL` when empty
    head: usize,
    /// Least recently used node, `NIL` when empty
    tail: usize,
    max_entries: usize,
    default_ttl: Duration,
    stats: CacheStats,
}

impl<K, V> LruStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty LRU store.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            max_entries,
            default_ttl,
            stats: CacheStats::new(),
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        self.nodes[idx]
            .as_ref()
            .expect("lru index references a live arena node")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.nodes[idx]
            .as_mut()
            .expect("lru index references a live arena node")
    }

    fn allocate(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Links a detached node in at the head of the recency list.
    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            self.node_mut(old_head).prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    /// Unlinks a node from the recency list without freeing it.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        if prev != NIL {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    /// Unlinks and frees a node, dropping its index entry.
    fn remove_node(&mut self, idx: usize) {
        self.detach(idx);
        let node = self.nodes[idx]
            .take()
            .expect("lru index references a live arena node");
        self.free.push(idx);
        self.index.remove(&node.entry.key);
    }

    /// Evicts the tail entry, the unique least recently used one.
    fn evict(&mut self) {
        if self.tail == NIL {
            return;
        }
        self.remove_node(self.tail);
        self.stats.record_eviction();
        debug!("lru eviction: dropped least recently used entry");
    }

    // == Consistency Check ==
    /// Walks the recency list and cross-checks it against the hash index.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, self.index.len(), "arena/index size mismatch");

        let mut seen = 0;
        let mut prev = NIL;
        let mut idx = self.head;
        while idx != NIL {
            let node = self.node(idx);
            assert_eq!(node.prev, prev, "broken back-link in recency list");
            assert_eq!(
                self.index.get(&node.entry.key).copied(),
                Some(idx),
                "index does not point at the node holding its key"
            );
            prev = idx;
            idx = node.next;
            seen += 1;
        }
        assert_eq!(prev, self.tail, "tail does not terminate the list");
        assert_eq!(seen, self.index.len(), "list length/index size mismatch");
    }
}

impl<K, V> Store<K, V> for LruStore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);

        if let Some(&idx) = self.index.get(&key) {
            self.node_mut(idx).entry.refresh(value, ttl);
            self.move_to_front(idx);
            return;
        }

        let idx = self.allocate(Node {
            entry: CacheEntry::new(key.clone(), value, ttl),
            prev: NIL,
            next: NIL,
        });
        self.attach_front(idx);
        self.index.insert(key, idx);

        // Insert first, evict after: size exceeds capacity by at most one
        // inside this call.
        if self.index.len() > self.max_entries {
            self.evict();
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.node(idx).entry.is_expired_at(Instant::now()) {
            self.remove_node(idx);
            self.stats.record_miss();
            return None;
        }

        self.move_to_front(idx);
        self.stats.record_hit();
        Some(self.node(idx).entry.value.clone())
    }

    fn delete(&mut self, key: &K) -> bool {
        match self.index.get(key).copied() {
            Some(idx) => {
                self.remove_node(idx);
                true
            }
            None => false,
        }
    }

    fn flush(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<usize> = self
            .index
            .values()
            .copied()
            .filter(|&idx| self.node(idx).entry.is_expired_at(now))
            .collect();

        let count = expired.len();
        for idx in expired {
            self.remove_node(idx);
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
