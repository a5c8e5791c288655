//! Tracks the wall-clock slot for the beacon chain.

mod manual_slot_clock;
mod system_time_slot_clock;

use std::time::Duration;
use types::Slot;

pub use crate::manual_slot_clock::ManualSlotClock;
pub use crate::system_time_slot_clock::SystemTimeSlotClock;

/// A clock that reports the current slot.
///
/// The clock is not required to be monotonically increasing; the wall clock
/// may jump backwards.
pub trait SlotClock: Send + Sync + Sized + Clone {
    /// Instantiate from the genesis time (duration since the unix epoch)
    /// and the slot duration.
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self;

    /// The current slot, or `None` if the genesis time is in the future.
    fn now(&self) -> Option<Slot>;

    /// Duration from the unix epoch to genesis.
    fn genesis_duration(&self) -> Duration;

    /// The length of a slot.
    fn slot_duration(&self) -> Duration;

    /// Duration from the unix epoch to the start of `slot`.
    fn start_of(&self, slot: Slot) -> Option<Duration> {
        self.slot_duration()
            .checked_mul(slot.as_u64().try_into().ok()?)
            .and_then(|offset| self.genesis_duration().checked_add(offset))
    }

    /// The unix timestamp, in seconds, at the start of `slot`.
    fn timestamp_at_slot(&self, slot: Slot) -> Option<u64> {
        self.start_of(slot).map(|duration| duration.as_secs())
    }
}
