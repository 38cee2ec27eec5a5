//! Request Arena (§4.4).
//!
//! Grounded in `melbi-core`'s use of `bumpalo::Bump` for arena allocation
//! (the teacher has no arena at all — vhp's values live in process-lifetime
//! `HashMap`/`Vec`s). `RequestArena` wraps a `Bump` for raw scratch
//! allocation (`alloc`) and a separate escape list for `Value`s that must
//! outlive the request: because `Value`'s heap boxes are `Rc`-based
//! (process-heap allocated, not bump-allocated — see `value::heap`'s doc
//! comment), "promoting" an escaped value to the global allocator is a
//! `deep_clone` into a `GlobalHeap` registry that survives `end_request`,
//! which is exactly the "ignore per-item copy failures, log one aggregate
//! count" contract in §4.4 applied to a fallible deep copy.

mod global_heap;
mod pool;

pub use global_heap::{GlobalHeap, PromotedId};
pub use pool::ArenaPool;

use crate::value::Value;
use bumpalo::Bump;
use std::cell::Cell;

/// Why an object escaped the request (§4.4). The current implementation
/// treats all reasons uniformly; a future policy layer could rate-limit or
/// audit by reason (§9 open question — left as future work).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeReason {
    StoredToSession,
    StoredToCache,
    StoredToGlobal,
    ReturnedToCaller,
    CapturedByClosure,
    ExplicitMark,
}

struct EscapeEntry {
    reason: EscapeReason,
    value: Value,
}

/// Per-request allocation statistics (§4.4 contract).
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaStats {
    pub allocations: u64,
    pub bytes: u64,
}

pub struct RequestArena {
    bump: Bump,
    request_id: u64,
    start_time: Cell<u64>,
    end_time: Cell<u64>,
    escapes: Vec<EscapeEntry>,
    stats: ArenaStats,
}

impl RequestArena {
    pub fn new() -> Self {
        Self {
            bump: Bump::new(),
            request_id: 0,
            start_time: Cell::new(0),
            end_time: Cell::new(0),
            escapes: Vec::new(),
            stats: ArenaStats::default(),
        }
    }

    /// Reset the bump cursor (capacity retained across requests), stamp a
    /// fresh request id / start timestamp, clear the escape list (§4.4).
    /// `now` is a monotonic clock reading supplied by the host — the engine
    /// itself never reads the wall clock (keeps the core deterministic).
    pub fn begin_request(&mut self, request_id: u64, now: u64) {
        self.bump.reset();
        self.request_id = request_id;
        self.start_time.set(now);
        self.end_time.set(0);
        self.escapes.clear();
        self.stats = ArenaStats::default();
        tracing::debug!(request_id, "arena: begin_request");
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// Bump-allocate `n` copies of `T::default()`, counting the allocation
    /// in per-request statistics.
    pub fn alloc<T: Copy + Default>(&mut self, n: usize) -> &mut [T] {
        self.stats.allocations += 1;
        self.stats.bytes += (n * std::mem::size_of::<T>()) as u64;
        self.bump.alloc_slice_fill_copy(n, T::default())
    }

    /// Record a value that must outlive the request (§4.4). The value
    /// itself is an ordinary `Value` (`Rc`-backed, already on the process
    /// heap); what "escapes" is the *arena's claim on it* — without a mark,
    /// `end_request` simply drops the last handle held by request-local
    /// state and the box is freed.
    pub fn mark_escape(&mut self, value: Value, reason: EscapeReason) {
        self.escapes.push(EscapeEntry { reason, value });
    }

    pub fn escape_count(&self) -> usize {
        self.escapes.len()
    }

    /// Promote escaped objects into `global`, stamp the end timestamp, and
    /// reset the bump cursor. Per-item copy failures (deep clone panics
    /// would be a logic bug, but a real copy hook over foreign memory can
    /// fail) are ignored; only an aggregate count is logged, per §4.4.
    pub fn end_request(&mut self, now: u64, global: &mut GlobalHeap) -> Vec<PromotedId> {
        self.end_time.set(now);
        let mut promoted = Vec::with_capacity(self.escapes.len());
        let mut failures = 0u64;
        for entry in self.escapes.drain(..) {
            match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| entry.value.deep_clone())) {
                Ok(copy) => promoted.push(global.promote(copy, entry.reason)),
                Err(_) => failures += 1,
            }
        }
        if failures > 0 {
            tracing::warn!(request_id = self.request_id, failures, "arena: escape promotion failures");
        }
        tracing::debug!(
            request_id = self.request_id,
            promoted = promoted.len(),
            allocations = self.stats.allocations,
            bytes = self.stats.bytes,
            "arena: end_request"
        );
        self.bump.reset();
        promoted
    }
}

impl Default for RequestArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayKey;

    #[test]
    fn reset_keeps_capacity_across_requests() {
        let mut arena = RequestArena::new();
        arena.begin_request(1, 0);
        let _: &mut [u64] = arena.alloc(64);
        let capacity_after_first = arena.bump.allocated_bytes();
        let mut global = GlobalHeap::new();
        arena.end_request(1, &mut global);

        arena.begin_request(2, 1);
        assert_eq!(arena.escape_count(), 0);
        // capacity is retained: no new chunk needed for an equal-sized alloc
        let _: &mut [u64] = arena.alloc(64);
        assert_eq!(arena.bump.allocated_bytes(), capacity_after_first);
    }

    #[test]
    fn escaped_array_survives_end_request() {
        let mut arena = RequestArena::new();
        arena.begin_request(1, 0);
        let arr = Value::new_array(vec![(ArrayKey::Integer(0), Value::Int(42))]);
        arena.mark_escape(arr.clone(), EscapeReason::ExplicitMark);

        let mut global = GlobalHeap::new();
        let ids = arena.end_request(10, &mut global);
        assert_eq!(ids.len(), 1);
        let promoted = global.get(ids[0]).unwrap();
        assert!(promoted.loose_eq(&arr));
        assert_eq!(arena.escape_count(), 0);
    }
}
