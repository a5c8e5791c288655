use crate::{Address, ExecutionBlockHash, ForkName, Hash256, Slot, VersionedHash};
use std::fmt;

pub const KZG_COMMITMENT_BYTES_LEN: usize = 48;
pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

/// A KZG commitment to a blob carried by a beacon block body.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KzgCommitment(pub [u8; KZG_COMMITMENT_BYTES_LEN]);

impl KzgCommitment {
    /// The versioned hash the execution engine uses to verify blob
    /// availability for this commitment.
    pub fn calculate_versioned_hash(&self) -> VersionedHash {
        let mut hashed_commitment = ethereum_hashing::hash(&self.0);
        hashed_commitment[0] = VERSIONED_HASH_VERSION_KZG;
        Hash256::from_slice(&hashed_commitment)
    }
}

impl fmt::Debug for KzgCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// The execution-layer identity of the payload embedded in a beacon block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionPayloadSummary {
    pub block_hash: ExecutionBlockHash,
    pub parent_hash: ExecutionBlockHash,
}

impl ExecutionPayloadSummary {
    /// True for the default payload (header) used before the merge
    /// transition is complete.
    pub fn is_empty(&self) -> bool {
        self.block_hash.is_zero() && self.parent_hash.is_zero()
    }
}

/// Execution-layer requests (deposits, withdrawals, consolidations)
/// extracted from an Electra block body. Opaque to the coordinator; the
/// engine interprets them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionRequests(pub Vec<Vec<u8>>);

/// A validator withdrawal expected in the next payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Withdrawal {
    pub index: u64,
    pub validator_index: u64,
    pub address: Address,
    pub amount: u64,
}

/// The parts of a beacon block the coordinator reads. The full block (and
/// its storage) live with external collaborators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeaconBlockSummary {
    pub slot: Slot,
    pub parent_root: Hash256,
    pub fork_name: ForkName,
    /// `None` before the Bellatrix fork.
    pub execution_payload: Option<ExecutionPayloadSummary>,
    /// Empty before Deneb.
    pub blob_kzg_commitments: Vec<KzgCommitment>,
    /// `None` before Electra.
    pub execution_requests: Option<ExecutionRequests>,
}

impl BeaconBlockSummary {
    /// Whether this block engages the execution engine.
    pub fn is_execution_block(&self) -> bool {
        self.fork_name.execution_enabled()
            && self
                .execution_payload
                .map_or(false, |payload| !payload.is_empty())
    }
}

/// The parts of a beacon state the attribute builder reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeaconStateSummary {
    pub slot: Slot,
    pub fork_name: ForkName,
    /// The randao mix at the state's current epoch.
    pub randao_mix: Hash256,
}
