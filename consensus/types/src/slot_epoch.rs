//! The `Slot` and `Epoch` types are defined as new types instead of type
//! aliases so that the compiler rejects mixing the two up.

use std::fmt;
use std::ops::{Add, AddAssign, Rem, Sub};

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u64);

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Slot {
    pub const fn new(slot: u64) -> Slot {
        Slot(slot)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The epoch this slot belongs to.
    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch(self.0 / slots_per_epoch)
    }

    pub fn saturating_sub(self, other: Slot) -> Slot {
        Slot(self.0.saturating_sub(other.0))
    }
}

impl Epoch {
    pub const fn new(epoch: u64) -> Epoch {
        Epoch(epoch)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The first slot of this epoch.
    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot(self.0.saturating_mul(slots_per_epoch))
    }

    pub fn end_slot(self, slots_per_epoch: u64) -> Slot {
        Slot(
            self.0
                .saturating_add(1)
                .saturating_mul(slots_per_epoch)
                .saturating_sub(1),
        )
    }
}

macro_rules! impl_common {
    ($type: ident) => {
        impl From<u64> for $type {
            fn from(x: u64) -> $type {
                $type(x)
            }
        }

        impl From<$type> for u64 {
            fn from(x: $type) -> u64 {
                x.0
            }
        }

        impl Add<u64> for $type {
            type Output = $type;

            fn add(self, rhs: u64) -> $type {
                $type(self.0.saturating_add(rhs))
            }
        }

        impl AddAssign<u64> for $type {
            fn add_assign(&mut self, rhs: u64) {
                self.0 = self.0.saturating_add(rhs);
            }
        }

        impl Sub<u64> for $type {
            type Output = $type;

            fn sub(self, rhs: u64) -> $type {
                $type(self.0.saturating_sub(rhs))
            }
        }

        impl Rem<u64> for $type {
            type Output = u64;

            fn rem(self, rhs: u64) -> u64 {
                self.0 % rhs
            }
        }

        impl PartialEq<u64> for $type {
            fn eq(&self, other: &u64) -> bool {
                self.0 == *other
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $type {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($type), self.0)
            }
        }
    };
}

impl_common!(Slot);
impl_common!(Epoch);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_to_epoch() {
        assert_eq!(Slot::new(0).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(31).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(32).epoch(32), Epoch::new(1));
    }

    #[test]
    fn epoch_slot_bounds() {
        assert_eq!(Epoch::new(1).start_slot(32), Slot::new(32));
        assert_eq!(Epoch::new(1).end_slot(32), Slot::new(63));
    }

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(Slot::new(u64::MAX) + 1, Slot::new(u64::MAX));
        assert_eq!(Slot::new(0) - 1, Slot::new(0));
    }
}
