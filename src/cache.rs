//! Identity Cache
//!
//! Bounded identity → node map with adaptive replacement. Entries seen once
//! live in T1 and entries seen again are promoted to T2; B1 and B2 remember
//! the keys recently evicted from each, and hits on those ghosts move the
//! target size `p` of T1 toward whichever list is paying off.

use crate::store::Node;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::trace;

/// Entries held when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 1024;

/// Thread-safe adaptive replacement cache keyed by identity
pub struct IdentityCache {
    state: Mutex<ArcState>,
}

struct ArcState {
    size: usize,
    /// Target size for T1
    p: usize,
    t1: LruCache<String, Node>,
    b1: LruCache<String, ()>,
    t2: LruCache<String, Node>,
    b2: LruCache<String, ()>,
}

impl ArcState {
    fn new(size: NonZeroUsize) -> Self {
        Self {
            size: size.get(),
            p: 0,
            t1: LruCache::new(size),
            b1: LruCache::new(size),
            t2: LruCache::new(size),
            b2: LruCache::new(size),
        }
    }

    fn get(&mut self, identity: &str) -> Option<Node> {
        // A second hit promotes out of the recency list
        if let Some(node) = self.t1.pop(identity) {
            self.t2.put(identity.to_string(), node);
            return Some(node);
        }
        self.t2.get(identity).copied()
    }

    fn put(&mut self, identity: &str, node: Node) {
        if self.t1.pop(identity).is_some() {
            self.t2.put(identity.to_string(), node);
            return;
        }

        if self.t2.contains(identity) {
            self.t2.put(identity.to_string(), node);
            return;
        }

        if self.b1.contains(identity) {
            // Recency ghost hit: grow T1's share
            let delta = if self.b2.len() > self.b1.len() {
                self.b2.len() / self.b1.len()
            } else {
                1
            };
            self.p = (self.p + delta).min(self.size);

            if self.t1.len() + self.t2.len() >= self.size {
                self.replace(false);
            }
            self.b1.pop(identity);
            self.t2.put(identity.to_string(), node);
            return;
        }

        if self.b2.contains(identity) {
            // Frequency ghost hit: shrink T1's share
            let delta = if self.b1.len() > self.b2.len() {
                self.b1.len() / self.b2.len()
            } else {
                1
            };
            self.p = self.p.saturating_sub(delta);

            if self.t1.len() + self.t2.len() >= self.size {
                self.replace(true);
            }
            self.b2.pop(identity);
            self.t2.put(identity.to_string(), node);
            return;
        }

        if self.t1.len() + self.t2.len() >= self.size {
            self.replace(false);
        }
        if self.b1.len() > self.size - self.p {
            self.b1.pop_lru();
        }
        if self.b2.len() > self.p {
            self.b2.pop_lru();
        }
        self.t1.put(identity.to_string(), node);
    }

    /// Evict one resident entry into its ghost list
    fn replace(&mut self, b2_contains_key: bool) {
        let t1_len = self.t1.len();
        let from_recent = t1_len > 0
            && (t1_len > self.p || (t1_len == self.p && b2_contains_key) || self.t2.is_empty());
        if from_recent {
            if let Some((identity, _)) = self.t1.pop_lru() {
                trace!(identity = %identity, "evicted from recency list");
                self.b1.put(identity, ());
            }
        } else if let Some((identity, _)) = self.t2.pop_lru() {
            trace!(identity = %identity, "evicted from frequency list");
            self.b2.put(identity, ());
        }
    }

    fn peek(&self, identity: &str) -> Option<Node> {
        self.t1
            .peek(identity)
            .or_else(|| self.t2.peek(identity))
            .copied()
    }

    fn contains(&self, identity: &str) -> bool {
        self.t1.contains(identity) || self.t2.contains(identity)
    }

    fn remove(&mut self, identity: &str) -> Option<Node> {
        let resident = self.t1.pop(identity).or_else(|| self.t2.pop(identity));
        self.b1.pop(identity);
        self.b2.pop(identity);
        resident
    }

    fn purge(&mut self) {
        self.t1.clear();
        self.t2.clear();
        self.b1.clear();
        self.b2.clear();
        self.p = 0;
    }

    fn len(&self) -> usize {
        self.t1.len() + self.t2.len()
    }
}

impl IdentityCache {
    /// Create a cache holding at most `capacity` nodes. Zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(ArcState::new(size)),
        }
    }

    /// Look up a node, recording the access
    pub fn get(&self, identity: &str) -> Option<Node> {
        self.state.lock().get(identity)
    }

    pub fn put(&self, identity: &str, node: Node) {
        self.state.lock().put(identity, node);
    }

    /// Look up a node without touching recency or frequency
    pub fn peek(&self, identity: &str) -> Option<Node> {
        self.state.lock().peek(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.state.lock().contains(identity)
    }

    /// Drop one identity, including its ghost entry
    pub fn remove(&self, identity: &str) -> Option<Node> {
        self.state.lock().remove(identity)
    }

    /// Drop every entry and reset adaptation
    pub fn purge(&self) {
        self.state.lock().purge();
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().size
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
