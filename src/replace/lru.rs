use crate::cache::{Addr, Cache};

use super::{AccessResult, Replace};

/// Recency-counter LRU.
///
/// Filling a vacant way only ages the ways up to and including it. Ways fill
/// in order, so those are exactly the occupied ways: the counters of the
/// still vacant ways are left alone and get reset when they are filled.
#[derive(Debug, Default)]
pub struct Lru {}

impl Replace for Lru {
    fn access(cache: &mut Cache<Self>, addr: Addr) -> AccessResult {
        let set = &mut cache.sets[addr.line];

        if let Some(way) = set.find(addr.tag) {
            set.promote(way);
            AccessResult::Hit
        } else if let Some(way) = set.vacant() {
            set.lines[way].fill(addr.tag);
            set.age(0..=way);
            AccessResult::Miss
        } else {
            set.evict(addr.tag);
            AccessResult::Miss
        }
    }
}
