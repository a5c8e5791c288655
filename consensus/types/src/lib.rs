//! Types shared between the execution coordinator, the subnet service and
//! their external collaborators.

mod chain_spec;
mod eth_spec;
mod execution_block_hash;
mod fork_name;
mod payload;
mod slot_epoch;
mod subnet_id;
mod sync_subnet_id;

pub use chain_spec::ChainSpec;
pub use eth_spec::{EthSpec, MainnetEthSpec, MinimalEthSpec};
pub use execution_block_hash::ExecutionBlockHash;
pub use fork_name::ForkName;
pub use payload::{
    BeaconBlockSummary, BeaconStateSummary, ExecutionPayloadSummary, ExecutionRequests,
    KzgCommitment, Withdrawal, KZG_COMMITMENT_BYTES_LEN, VERSIONED_HASH_VERSION_KZG,
};
pub use slot_epoch::{Epoch, Slot};
pub use subnet_id::SubnetId;
pub use sync_subnet_id::SyncSubnetId;

pub type Hash256 = ethereum_types::H256;
pub type Uint256 = ethereum_types::U256;
pub type Address = ethereum_types::H160;
pub type VersionedHash = Hash256;
pub type CommitteeIndex = u64;

/// The bitfield of attestation subnets advertised in the node's ENR.
pub type EnrAttestationBitfield<E> = ssz_types::BitVector<<E as EthSpec>::SubnetBitfieldLength>;
/// The bitfield of sync committee subnets advertised in the node's ENR.
pub type EnrSyncCommitteeBitfield<E> =
    ssz_types::BitVector<<E as EthSpec>::SyncCommitteeSubnetCount>;
