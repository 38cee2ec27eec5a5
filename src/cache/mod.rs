//! Inline Method Cache (§4.6).
//!
//! Grounded in vhp's own method-resolution chain walk
//! (`vm/methods.rs::find_method_in_chain`, which walks `parent` every
//! single call) — this cache exists precisely to avoid repeating that walk.
//! `invalidate_class` generalizes the teacher's implicit assumption that
//! `CompiledClass.methods` never changes after registration into an
//! explicit invalidation hook for hot class-table mutation (§4.6 safety
//! requirement, §5 invalidation ordering).

use crate::bytecode::CompiledFunction;
use std::collections::HashMap;
use std::rc::Rc;

const MAX_POLYMORPHIC: usize = 4;

#[derive(Clone)]
struct CacheEntry {
    class_id: u32,
    method_ref: Rc<CompiledFunction>,
    hit_count: u64,
}

/// Per-name bucket: monomorphic fast path when it holds one entry,
/// polymorphic up to `MAX_POLYMORPHIC`, megamorphic (always-miss) beyond
/// that (§4.6).
#[derive(Default)]
struct Bucket {
    entries: Vec<CacheEntry>,
    megamorphic: bool,
}

#[derive(Default)]
pub struct InlineMethodCache {
    by_name: HashMap<String, Bucket>,
}

pub enum Lookup {
    Hit(Rc<CompiledFunction>),
    Miss,
}

impl InlineMethodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup on call (§4.6): exact `(name, class_id)` match is used
    /// directly; anything else is a miss, leaving the slow path (walking
    /// the class's method table and inherited chain) to the caller.
    pub fn lookup(&mut self, name: &str, class_id: u32) -> Lookup {
        let Some(bucket) = self.by_name.get_mut(name) else {
            return Lookup::Miss;
        };
        if bucket.megamorphic {
            return Lookup::Miss;
        }
        if let Some(entry) = bucket.entries.iter_mut().find(|e| e.class_id == class_id) {
            entry.hit_count += 1;
            return Lookup::Hit(entry.method_ref.clone());
        }
        Lookup::Miss
    }

    /// Population after a slow-path resolution (§4.6): inserts the new
    /// binding, evicting the least-frequently-hit entry if the bucket is
    /// full; beyond `MAX_POLYMORPHIC` distinct classes the name becomes
    /// megamorphic and future lookups always miss.
    pub fn populate(&mut self, name: &str, class_id: u32, method_ref: Rc<CompiledFunction>) {
        let bucket = self.by_name.entry(name.to_string()).or_default();
        if bucket.megamorphic {
            return;
        }
        if bucket.entries.iter().any(|e| e.class_id == class_id) {
            return;
        }
        if bucket.entries.len() < MAX_POLYMORPHIC {
            bucket.entries.push(CacheEntry { class_id, method_ref, hit_count: 0 });
            return;
        }
        if let Some((idx, _)) = bucket
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.hit_count)
        {
            bucket.entries.remove(idx);
            bucket.entries.push(CacheEntry { class_id, method_ref, hit_count: 0 });
        } else {
            bucket.megamorphic = true;
        }
    }

    /// Removes all entries referencing `class_id` across all name buckets
    /// (§4.6, §5 invalidation ordering). Must be called before a class
    /// descriptor's rebound method table becomes reachable.
    pub fn invalidate_class(&mut self, class_id: u32) {
        for bucket in self.by_name.values_mut() {
            bucket.entries.retain(|e| e.class_id != class_id);
        }
        tracing::debug!(class_id, "inline cache: invalidated");
    }

    pub fn clear_all(&mut self) {
        self.by_name.clear();
    }

    /// Number of distinct `class_id` bindings currently cached for `name`
    /// (0 for an absent or evicted-to-megamorphic name).
    pub fn entry_count(&self, name: &str) -> usize {
        self.by_name.get(name).map(|b| b.entries.len()).unwrap_or(0)
    }

    pub fn hit_count(&self, name: &str, class_id: u32) -> Option<u64> {
        self.by_name
            .get(name)?
            .entries
            .iter()
            .find(|e| e.class_id == class_id)
            .map(|e| e.hit_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::FunctionBuilder;

    fn dummy_fn(name: &str) -> Rc<CompiledFunction> {
        Rc::new(FunctionBuilder::new(name).build())
    }

    #[test]
    fn monomorphic_hit_after_populate() {
        let mut cache = InlineMethodCache::new();
        assert!(matches!(cache.lookup("inc", 1), Lookup::Miss));
        cache.populate("inc", 1, dummy_fn("Counter::inc"));
        assert!(matches!(cache.lookup("inc", 1), Lookup::Hit(_)));
        assert_eq!(cache.entry_count("inc"), 1);
    }

    #[test]
    fn invalidate_class_removes_entries() {
        let mut cache = InlineMethodCache::new();
        cache.populate("inc", 1, dummy_fn("Counter::inc"));
        cache.invalidate_class(1);
        assert!(matches!(cache.lookup("inc", 1), Lookup::Miss));
    }

    #[test]
    fn beyond_max_evicts_least_hit() {
        let mut cache = InlineMethodCache::new();
        for class_id in 0..4 {
            cache.populate("m", class_id, dummy_fn("m"));
        }
        // hit class 1,2,3 once each, leave class 0 cold
        for class_id in 1..4 {
            let _ = cache.lookup("m", class_id);
        }
        cache.populate("m", 4, dummy_fn("m"));
        assert!(matches!(cache.lookup("m", 0), Lookup::Miss));
        assert!(matches!(cache.lookup("m", 4), Lookup::Hit(_)));
    }
}
