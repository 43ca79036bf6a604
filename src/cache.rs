//! Bounded transform result cache
//!
//! A key to value map with a maximum entry count and a per-entry
//! time-to-live. Inserting beyond capacity evicts the least recently used
//! entry; `get` and `set` both count as use. Expired entries are treated as
//! absent and dropped when encountered.
//!
//! Recency is a doubly linked list threaded through a slab of slots by
//! index, so lookup, insert and eviction are all O(1). The cache is the one
//! shared mutable structure in the crate. A single `parking_lot::Mutex`
//! guards it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::transform::TransformResult;

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    /// Maximum number of entries; zero disables storage
    pub max_entries: usize,
    /// Entry lifetime in milliseconds; zero means entries never expire
    pub ttl_ms: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl_ms: 300_000,
        }
    }
}

impl CacheOptions {
    fn ttl(&self) -> Option<Duration> {
        (self.ttl_ms > 0).then(|| Duration::from_millis(self.ttl_ms))
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(self.inserted_at) >= ttl)
    }
}

/// A stored entry plus its links in the recency list
#[derive(Debug)]
struct Slot<V> {
    key: String,
    entry: CacheEntry<V>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Slab of slots threaded by a doubly linked recency list
///
/// `head` is the most recently used slot and `tail` the least. Freed slot
/// indices are reused, so the slab never grows past the peak entry count.
#[derive(Debug)]
struct CacheState<V> {
    index: HashMap<String, usize>,
    slots: Vec<Option<Slot<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn slot(&self, index: usize) -> Option<&Slot<V>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut Slot<V>> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    fn lookup(&self, key: &str) -> Option<&Slot<V>> {
        self.index.get(key).and_then(|&index| self.slot(index))
    }

    fn unlink(&mut self, index: usize) {
        let Some((prev, next)) = self.slot(index).map(|slot| (slot.prev, slot.next)) else {
            return;
        };
        match prev {
            Some(prev) => {
                if let Some(slot) = self.slot_mut(prev) {
                    slot.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(slot) = self.slot_mut(next) {
                    slot.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, index: usize) {
        let old_head = self.head;
        if let Some(slot) = self.slot_mut(index) {
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(head) = old_head
            && let Some(slot) = self.slot_mut(head)
        {
            slot.prev = Some(index);
        }
        self.head = Some(index);
        if self.tail.is_none() {
            self.tail = Some(index);
        }
    }

    /// Mark a slot as most recently used
    fn touch(&mut self, index: usize) {
        if self.head != Some(index) {
            self.unlink(index);
            self.push_front(index);
        }
    }

    fn insert(&mut self, key: String, entry: CacheEntry<V>) {
        if let Some(&index) = self.index.get(&key) {
            if let Some(slot) = self.slot_mut(index) {
                slot.entry = entry;
            }
            self.touch(index);
            return;
        }

        let slot = Slot {
            key: key.clone(),
            entry,
            prev: None,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, index);
        self.push_front(index);
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let index = self.index.remove(key)?;
        self.unlink(index);
        let slot = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        Some(slot.entry)
    }

    fn evict_least_recent(&mut self) {
        let Some(key) = self.tail.and_then(|tail| self.slot(tail)).map(|slot| slot.key.clone()) else {
            return;
        };
        trace!(key = %key, "evicting least recently used cache entry");
        self.remove(&key);
    }

    fn purge_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .index
            .keys()
            .filter(|key| self.lookup(key).is_some_and(|slot| slot.entry.is_expired(now)))
            .cloned()
            .collect();
        for key in expired {
            self.remove(&key);
        }
    }

    fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Thread-safe LRU cache with TTL
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::cache::{CacheOptions, TransformCache};
/// use agent_seo_core::transform::TransformResult;
///
/// let cache = TransformCache::new(CacheOptions { max_entries: 2, ..Default::default() });
/// for key in ["a", "b", "c"] {
///     cache.set(key, TransformResult::default());
/// }
///
/// assert_eq!(cache.size(), 2);
/// assert!(!cache.has("a"));
/// ```
#[derive(Debug)]
pub struct TransformCache<V = TransformResult> {
    options: CacheOptions,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> TransformCache<V> {
    pub fn new(options: CacheOptions) -> Self {
        Self {
            options,
            state: Mutex::new(CacheState::new()),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Look up a live entry, marking it as most recently used
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut state = self.state.lock();

        let index = *state.index.get(key)?;
        if state.slot(index)?.entry.is_expired(now) {
            state.remove(key);
            return None;
        }

        state.touch(index);
        state.slot(index).map(|slot| slot.entry.value.clone())
    }

    /// Insert with the configured TTL
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.options.ttl());
    }

    /// Insert with an explicit TTL; `None` never expires
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        if self.options.max_entries == 0 {
            return;
        }

        let key = key.into();
        let mut state = self.state.lock();

        if !state.index.contains_key(&key) {
            while state.len() >= self.options.max_entries {
                state.evict_least_recent();
            }
        }

        state.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Whether a live entry exists; does not affect recency
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        self.state
            .lock()
            .lookup(key)
            .is_some_and(|slot| !slot.entry.is_expired(now))
    }

    /// Remove one entry, returning whether it existed
    pub fn remove(&self, key: &str) -> bool {
        self.state.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.state.lock().clear();
    }

    /// Number of live entries
    pub fn size(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.purge_expired(now);
        state.len()
    }
}

impl<V: Clone> Default for TransformCache<V> {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}
