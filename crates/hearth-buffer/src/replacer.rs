//! LRU-K replacement policy for buffer pool frames.
//!
//! LRU-K evicts the frame whose k-th most recent access lies furthest in
//! the past (the largest "backward k-distance"). Frames with fewer than
//! k recorded accesses have infinite backward distance and are evicted
//! before any frame with a full history, in FIFO order of their earliest
//! recorded access. This distinguishes frames that are genuinely hot
//! from frames touched a couple of times by a passing scan.

use std::collections::{HashMap, VecDeque};

use hearth_common::types::FrameId;
use parking_lot::Mutex;

/// Access history for one frame known to the replacer.
struct FrameRecord {
    /// The most recent (at most k) access timestamps, oldest at the front.
    history: VecDeque<u64>,
    /// Whether the pool has released this frame for eviction.
    evictable: bool,
}

impl FrameRecord {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            evictable: false,
        }
    }

    /// The timestamp victim selection orders by: the k-th most recent
    /// access when the history is full, otherwise the earliest access
    /// on record. Records are never empty.
    fn front(&self) -> u64 {
        *self.history.front().expect("frame record with no accesses")
    }

    fn has_k_accesses(&self, k: usize) -> bool {
        self.history.len() >= k
    }
}

struct ReplacerInner {
    /// frame id → access history, for frames seen via `record_access`.
    frames: HashMap<FrameId, FrameRecord>,
    /// Logical clock, incremented once per recorded access.
    current_timestamp: u64,
    /// Number of frames currently marked evictable.
    evictable_count: usize,
}

/// LRU-K replacer over a fixed universe of frame ids.
///
/// The replacer only knows about frames it has been told about through
/// [`record_access`](Self::record_access); `set_evictable` and
/// [`remove`](Self::remove) on a frame it has never seen are silent
/// no-ops. Frame ids at or beyond the configured capacity are a
/// programming error and panic.
///
/// All operations take a single internal mutex, so the replacer is safe
/// to share even though the buffer pool already serializes its calls.
pub struct LruKReplacer {
    inner: Mutex<ReplacerInner>,
    num_frames: usize,
    k: usize,
}

impl LruKReplacer {
    /// Creates a replacer for frame ids `0..num_frames`.
    ///
    /// # Panics
    ///
    /// Panics if `k < 1`.
    pub fn new(num_frames: usize, k: usize) -> Self {
        assert!(k >= 1, "LRU-K requires k >= 1");
        Self {
            inner: Mutex::new(ReplacerInner {
                frames: HashMap::new(),
                current_timestamp: 0,
                evictable_count: 0,
            }),
            num_frames,
            k,
        }
    }

    /// Records an access to `frame_id` at the current timestamp.
    ///
    /// The first access to a frame creates its record, marked
    /// non-evictable. Only the most recent k timestamps are retained.
    ///
    /// # Panics
    ///
    /// Panics if `frame_id` is outside the replacer's frame universe.
    pub fn record_access(&self, frame_id: FrameId) {
        self.check_range(frame_id);
        let mut inner = self.inner.lock();

        let ts = inner.current_timestamp;
        let record = inner
            .frames
            .entry(frame_id)
            .or_insert_with(FrameRecord::new);
        record.history.push_back(ts);
        if record.history.len() > self.k {
            record.history.pop_front();
        }

        inner.current_timestamp += 1;
    }

    /// Marks `frame_id` evictable or non-evictable.
    ///
    /// A frame the replacer has never seen is ignored: evictability is
    /// an attribute of a recorded history, and only `record_access`
    /// introduces frames.
    ///
    /// # Panics
    ///
    /// Panics if `frame_id` is outside the replacer's frame universe.
    pub fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        self.check_range(frame_id);
        let mut inner = self.inner.lock();

        let Some(record) = inner.frames.get_mut(&frame_id) else {
            return;
        };
        if record.evictable == evictable {
            return;
        }
        record.evictable = evictable;

        if evictable {
            inner.evictable_count += 1;
        } else {
            inner.evictable_count -= 1;
        }
    }

    /// Evicts the evictable frame with the largest backward k-distance.
    ///
    /// Frames with fewer than k recorded accesses dominate every frame
    /// with a full history; among those, the one first seen earliest
    /// wins. Otherwise the frame whose k-th most recent access is oldest
    /// is chosen. The victim's record is erased entirely.
    ///
    /// Returns `None` when no frame is evictable.
    pub fn evict(&self) -> Option<FrameId> {
        let mut inner = self.inner.lock();
        if inner.evictable_count == 0 {
            return None;
        }

        let mut victim: Option<FrameId> = None;
        let mut victim_infinite = false;
        let mut victim_front = 0u64;

        for (&frame_id, record) in &inner.frames {
            if !record.evictable {
                continue;
            }

            let infinite = !record.has_k_accesses(self.k);
            let front = record.front();

            // Infinite distance dominates any finite distance. Within a
            // class, the smaller front timestamp wins: the earliest first
            // access among infinite candidates, or the oldest k-th most
            // recent access (the largest backward distance) otherwise.
            let better = match victim {
                None => true,
                Some(_) => match (infinite, victim_infinite) {
                    (true, false) => true,
                    (false, true) => false,
                    _ => front < victim_front,
                },
            };

            if better {
                victim = Some(frame_id);
                victim_infinite = infinite;
                victim_front = front;
            }
        }

        let victim = victim.expect("evictable_count > 0 but no evictable record");
        inner.frames.remove(&victim);
        inner.evictable_count -= 1;
        Some(victim)
    }

    /// Erases `frame_id`'s record without going through victim selection.
    ///
    /// A frame the replacer has never seen is ignored.
    ///
    /// # Panics
    ///
    /// Panics if `frame_id` is outside the replacer's frame universe, or
    /// if the frame is recorded but not evictable: callers must only
    /// remove frames they have already released.
    pub fn remove(&self, frame_id: FrameId) {
        self.check_range(frame_id);
        let mut inner = self.inner.lock();

        let Some(record) = inner.frames.get(&frame_id) else {
            return;
        };
        assert!(
            record.evictable,
            "cannot remove non-evictable frame {frame_id}"
        );

        inner.frames.remove(&frame_id);
        inner.evictable_count -= 1;
    }

    /// Returns the number of frames currently marked evictable.
    pub fn size(&self) -> usize {
        self.inner.lock().evictable_count
    }

    fn check_range(&self, frame_id: FrameId) {
        assert!(
            frame_id.as_usize() < self.num_frames,
            "frame id {frame_id} out of range (num_frames = {})",
            self.num_frames
        );
    }
}

impl std::fmt::Debug for LruKReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruKReplacer")
            .field("num_frames", &self.num_frames)
            .field("k", &self.k)
            .field("evictable", &inner.evictable_count)
            .field("tracked", &inner.frames.len())
            .finish()
    }
}
