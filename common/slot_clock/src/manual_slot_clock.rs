use super::SlotClock;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use types::Slot;

/// A clock which is advanced by hand. Used in testing.
#[derive(Clone)]
pub struct ManualSlotClock {
    slot: Arc<RwLock<Slot>>,
    genesis_duration: Duration,
    slot_duration: Duration,
}

impl ManualSlotClock {
    pub fn set_slot(&self, slot: Slot) {
        *self.slot.write() = slot;
    }

    pub fn advance_slot(&self) {
        let current = *self.slot.read();
        self.set_slot(current + 1)
    }
}

impl SlotClock for ManualSlotClock {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self {
        assert!(!slot_duration.is_zero(), "slot_duration must be non-zero");
        Self {
            slot: Arc::new(RwLock::new(genesis_slot)),
            genesis_duration,
            slot_duration,
        }
    }

    fn now(&self) -> Option<Slot> {
        Some(*self.slot.read())
    }

    fn genesis_duration(&self) -> Duration {
        self.genesis_duration
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }
}
