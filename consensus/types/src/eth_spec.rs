use ssz_types::typenum::{Unsigned, U4, U64};
use std::fmt::Debug;

/// Compile-time network parameters.
///
/// Only the parameters the coordination core reads are present; the rest of
/// the usual preset surface belongs to the external state-transition crates.
pub trait EthSpec: 'static + Default + Sync + Send + Clone + Debug + PartialEq + Eq {
    /// The length of the `attnets` bitfield in the ENR.
    type SubnetBitfieldLength: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq;
    /// The length of the `syncnets` bitfield in the ENR.
    type SyncCommitteeSubnetCount: Unsigned + Clone + Sync + Send + Debug + PartialEq + Eq;

    fn slots_per_epoch() -> u64;
}

/// Ethereum Foundation mainnet specification.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct MainnetEthSpec;

impl EthSpec for MainnetEthSpec {
    type SubnetBitfieldLength = U64;
    type SyncCommitteeSubnetCount = U4;

    fn slots_per_epoch() -> u64 {
        32
    }
}

/// Specification for interop testing, with a shortened epoch.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct MinimalEthSpec;

impl EthSpec for MinimalEthSpec {
    type SubnetBitfieldLength = U64;
    type SyncCommitteeSubnetCount = U4;

    fn slots_per_epoch() -> u64 {
        8
    }
}
