//! Type-Feedback Collector (§4.5).
//!
//! New subsystem — vhp has no instrumentation at all, confirming the
//! spec's own note that the instruction set only *admits* a future JIT
//! tier. Built as a flat `HashMap<u32, Histogram>`, the same "flat map
//! keyed by dense id" idiom vhp's `VM` struct uses for `functions`/
//! `classes` (`vm/mod.rs`), applied to call sites instead of function
//! names.

use crate::value::TypeTag;
use std::collections::HashMap;

/// Category mask OR'd into the high bits of a call site id (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SiteCategory {
    RegularCall = 0,
    BuiltinCall = 1 << 29,
    MethodCall = 2 << 29,
    PropertyAccess = 3 << 29,
    TypeGuard = 4 << 29,
}

const CATEGORY_MASK: u32 = 0b111 << 29;

/// Encode a call site id from the function-local instruction pointer and a
/// category tag (§4.5 "site id encoding").
pub fn site_id(ip: u32, category: SiteCategory) -> u32 {
    debug_assert!(ip & CATEGORY_MASK == 0, "ip must fit below the category mask");
    (ip & !CATEGORY_MASK) | category as u32
}

const MAX_SLOTS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct Histogram {
    slots: Vec<(TypeTag, u32)>,
    /// Set once the histogram has overflowed its bounded slot count — a
    /// "polymorphic / megamorphic" sentinel (§4.5).
    megamorphic: bool,
}

impl Histogram {
    pub fn observe(&mut self, tag: TypeTag) {
        if self.megamorphic {
            return;
        }
        if let Some(slot) = self.slots.iter_mut().find(|(t, _)| *t == tag) {
            slot.1 += 1;
            return;
        }
        if self.slots.len() < MAX_SLOTS {
            self.slots.push((tag, 1));
        } else {
            self.megamorphic = true;
            self.slots.clear();
        }
    }

    pub fn is_megamorphic(&self) -> bool {
        self.megamorphic
    }

    pub fn slots(&self) -> &[(TypeTag, u32)] {
        &self.slots
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.megamorphic = false;
    }
}

#[derive(Debug, Default)]
pub struct TypeFeedbackCollector {
    sites: HashMap<u32, Histogram>,
    deopt_count: u64,
}

impl TypeFeedbackCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_observation(&mut self, site: u32, tag: TypeTag) {
        self.sites.entry(site).or_default().observe(tag);
    }

    pub fn histogram(&self, site: u32) -> Option<&Histogram> {
        self.sites.get(&site)
    }

    pub fn deopt_count(&self) -> u64 {
        self.deopt_count
    }

    /// The single point that records a guard miss (§4.5): increments the
    /// global deopt counter and clears the histogram for that site,
    /// preventing repeated specialization attempts on a cold miss.
    pub fn record_guard_miss(&mut self, site: u32) {
        self.deopt_count += 1;
        if let Some(h) = self.sites.get_mut(&site) {
            h.clear();
        }
        tracing::trace!(site, deopt_count = self.deopt_count, "type feedback: guard miss");
    }

    /// Returns whether `actual` matched `expected`; records a miss when it
    /// doesn't. This is `checkTypeGuard` from §4.5.
    pub fn check_type_guard(&mut self, site: u32, expected: TypeTag, actual: TypeTag) -> bool {
        self.record_observation(site, actual);
        let matched = actual == expected;
        if !matched {
            self.record_guard_miss(site);
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_id_packs_category_into_high_bits() {
        let id = site_id(42, SiteCategory::MethodCall);
        assert_eq!(id & CATEGORY_MASK, SiteCategory::MethodCall as u32);
        assert_eq!(id & !CATEGORY_MASK, 42);
    }

    #[test]
    fn histogram_overflows_to_megamorphic() {
        let mut h = Histogram::default();
        for tag in [TypeTag::Int, TypeTag::Float, TypeTag::String, TypeTag::Bool, TypeTag::Array] {
            h.observe(tag);
        }
        assert!(h.is_megamorphic());
    }

    #[test]
    fn guard_miss_clears_histogram_and_increments_deopt() {
        let mut c = TypeFeedbackCollector::new();
        let site = site_id(0, SiteCategory::TypeGuard);
        assert!(c.check_type_guard(site, TypeTag::Int, TypeTag::Int));
        assert!(!c.check_type_guard(site, TypeTag::Int, TypeTag::String));
        assert_eq!(c.deopt_count(), 1);
        assert!(c.histogram(site).unwrap().slots().is_empty());
    }
}
