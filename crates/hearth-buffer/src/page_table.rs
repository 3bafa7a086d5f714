//! Extendible hash table used as the buffer pool's page table.
//!
//! An extendible hash table grows by splitting individual buckets and,
//! when a splitting bucket is already as deep as the directory, doubling
//! the directory. The directory index of a key is the low `global_depth`
//! bits of its hash; each bucket records how many of those bits actually
//! determine membership (its `local_depth`), and multiple directory
//! slots alias one bucket whenever `local_depth < global_depth`.
//!
//! Buckets live in a grow-only arena and the directory stores arena
//! indices, so aliased slots share a bucket without reference counting
//! and splitting never reclaims storage (buckets are not merged back
//! when they empty).

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use parking_lot::Mutex;

/// A bucket: up to `bucket_size` key-value pairs plus a local depth.
struct Bucket<K, V> {
    items: Vec<(K, V)>,
    local_depth: usize,
}

impl<K: Eq, V> Bucket<K, V> {
    fn new(local_depth: usize) -> Self {
        Self {
            items: Vec::new(),
            local_depth,
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.items.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                self.items.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}

struct TableInner<K, V> {
    /// Directory of arena indices; length is always `2^global_depth`.
    directory: Vec<usize>,
    /// Bucket arena. Splitting appends; nothing is ever removed.
    buckets: Vec<Bucket<K, V>>,
    global_depth: usize,
}

/// Extendible hash table mapping keys to values with O(1) expected lookup.
///
/// The hasher is a type parameter with the same default as
/// `std::collections::HashMap`, so tests can substitute a transparent
/// hasher and steer keys into chosen buckets. All operations serialize
/// on one internal mutex; `find` therefore returns an owned clone of the
/// value rather than a reference into the table.
pub struct ExtendibleHashTable<K, V, S = RandomState> {
    inner: Mutex<TableInner<K, V>>,
    hasher: S,
    bucket_size: usize,
}

impl<K, V> ExtendibleHashTable<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Creates a table whose buckets hold up to `bucket_size` entries.
    pub fn new(bucket_size: usize) -> Self {
        Self::with_hasher(bucket_size, RandomState::new())
    }
}

impl<K, V, S> ExtendibleHashTable<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    /// Creates a table that hashes keys with the given build hasher.
    pub fn with_hasher(bucket_size: usize, hasher: S) -> Self {
        assert!(bucket_size >= 1, "bucket size must be positive");
        Self {
            inner: Mutex::new(TableInner {
                directory: vec![0],
                buckets: vec![Bucket::new(0)],
                global_depth: 0,
            }),
            hasher,
            bucket_size,
        }
    }

    /// Returns the value associated with `key`, if any.
    pub fn find(&self, key: &K) -> Option<V> {
        let inner = self.inner.lock();
        let index = self.index_of(key, inner.global_depth);
        let bucket = inner.directory.get(index).copied()?;
        inner.buckets[bucket].get(key).cloned()
    }

    /// Removes `key` from the table. Returns whether it was present.
    ///
    /// The bucket may become empty; it is not merged back.
    pub fn remove(&self, key: &K) -> bool {
        let mut inner = self.inner.lock();
        let index = self.index_of(key, inner.global_depth);
        let Some(bucket) = inner.directory.get(index).copied() else {
            return false;
        };
        inner.buckets[bucket].remove(key)
    }

    /// Inserts `key` → `value`, overwriting any existing entry.
    ///
    /// When the target bucket is full, it is split (doubling the
    /// directory if needed) and the insertion retried. A split can leave
    /// the target full again when all resident keys land on one side;
    /// the retry loop continues until the insertion succeeds.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        loop {
            let index = self.index_of(&key, inner.global_depth);
            let bucket_idx = inner.directory[index];
            let bucket = &mut inner.buckets[bucket_idx];

            if let Some((_, v)) = bucket.items.iter_mut().find(|(k, _)| *k == key) {
                *v = value;
                return;
            }
            if bucket.items.len() < self.bucket_size {
                bucket.items.push((key, value));
                return;
            }

            self.split_bucket(&mut inner, bucket_idx);
        }
    }

    /// Returns the number of low hash bits used to index the directory.
    pub fn global_depth(&self) -> usize {
        self.inner.lock().global_depth
    }

    /// Returns the local depth of the bucket referenced by directory
    /// slot `dir_index`.
    ///
    /// # Panics
    ///
    /// Panics if `dir_index` is outside the directory.
    pub fn local_depth(&self, dir_index: usize) -> usize {
        let inner = self.inner.lock();
        assert!(dir_index < inner.directory.len(), "directory index out of range");
        inner.buckets[inner.directory[dir_index]].local_depth
    }

    /// Returns the number of distinct buckets reachable through the
    /// directory.
    pub fn num_buckets(&self) -> usize {
        // The arena only ever holds live buckets: splitting appends the
        // sibling and nothing is removed.
        self.inner.lock().buckets.len()
    }

    /// Directory index of `key`: the low `global_depth` bits of its hash.
    fn index_of(&self, key: &K, global_depth: usize) -> usize {
        let mask = (1usize << global_depth) - 1;
        (self.hasher.hash_one(key) as usize) & mask
    }

    /// Splits the bucket at arena index `bucket_idx`.
    fn split_bucket(&self, inner: &mut TableInner<K, V>, bucket_idx: usize) {
        // Double the directory when the bucket is already as deep as it:
        // every old slot gains a twin differing only in the new high bit,
        // initially aliasing the same bucket.
        if inner.buckets[bucket_idx].local_depth == inner.global_depth {
            let twin = inner.directory.clone();
            inner.directory.extend(twin);
            inner.global_depth += 1;
        }

        // Deepen the bucket and create its sibling at the same depth.
        inner.buckets[bucket_idx].local_depth += 1;
        let new_depth = inner.buckets[bucket_idx].local_depth;
        let sibling_idx = inner.buckets.len();
        inner.buckets.push(Bucket::new(new_depth));

        // Repoint every aliasing slot whose new distinguishing bit is 1.
        let split_mask = 1usize << (new_depth - 1);
        for i in 0..inner.directory.len() {
            if inner.directory[i] == bucket_idx && (i & split_mask) != 0 {
                inner.directory[i] = sibling_idx;
            }
        }

        // Rehash the split bucket's contents: each entry re-routes through
        // the directory and lands either back home or in the sibling.
        let items = std::mem::take(&mut inner.buckets[bucket_idx].items);
        for (key, value) in items {
            let index = self.index_of(&key, inner.global_depth);
            let target = inner.directory[index];
            inner.buckets[target].items.push((key, value));
        }
    }
}

impl<K, V, S> std::fmt::Debug for ExtendibleHashTable<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ExtendibleHashTable")
            .field("global_depth", &inner.global_depth)
            .field("num_buckets", &inner.buckets.len())
            .field("bucket_size", &self.bucket_size)
            .finish()
    }
}
