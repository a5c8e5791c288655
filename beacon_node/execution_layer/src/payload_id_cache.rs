use crate::engine_api::PayloadId;
use lru::LruCache;
use parking_lot::Mutex;
use types::{Hash256, Slot};

pub const DEFAULT_PAYLOAD_ID_CACHE_SIZE: usize = 16;

/// Entries older than this many slots are dropped whenever a newer entry is
/// inserted. A payload id is only useful until its proposal slot has
/// passed.
pub const PAYLOAD_ID_CACHE_SLOT_WINDOW: u64 = 2;

/// A cache mapping `(slot, head_root)` to the payload id the engine handed
/// back for that proposal. Written by the forkchoice-update path, read by
/// the proposer path.
pub struct PayloadIdCache {
    payload_ids: Mutex<LruCache<PayloadIdCacheKey, PayloadId>>,
}

#[derive(Clone, Copy, Hash, PartialEq, Eq)]
struct PayloadIdCacheKey {
    slot: Slot,
    head_root: Hash256,
}

impl Default for PayloadIdCache {
    fn default() -> Self {
        PayloadIdCache {
            payload_ids: Mutex::new(LruCache::new(DEFAULT_PAYLOAD_ID_CACHE_SIZE)),
        }
    }
}

impl PayloadIdCache {
    pub fn insert(&self, slot: Slot, head_root: Hash256, payload_id: PayloadId) {
        let mut cache = self.payload_ids.lock();
        let stale = cache
            .iter()
            .filter(|(key, _)| key.slot + PAYLOAD_ID_CACHE_SLOT_WINDOW <= slot)
            .map(|(key, _)| *key)
            .collect::<Vec<_>>();
        for key in stale {
            cache.pop(&key);
        }
        cache.put(PayloadIdCacheKey { slot, head_root }, payload_id);
    }

    pub fn get(&self, slot: Slot, head_root: Hash256) -> Option<PayloadId> {
        self.payload_ids
            .lock()
            .get(&PayloadIdCacheKey { slot, head_root })
            .copied()
    }
}
