//! Types and the trait over which consensus drives an external execution
//! engine. The JSON-RPC transport lives with the engine client; this crate
//! only sees the typed surface.

use async_trait::async_trait;
use strum::IntoStaticStr;
use types::{
    ExecutionBlockHash, ExecutionPayloadSummary, ExecutionRequests, Hash256, VersionedHash,
};

pub use crate::payload_attributes::PayloadAttributes;

/// The engine-assigned handle used to retrieve a payload built for a
/// previous forkchoice update carrying attributes.
pub type PayloadId = [u8; 8];

#[derive(Debug)]
pub enum Error {
    RequestFailed(String),
    BadResponse(String),
    ServerMessage { code: i64, message: String },
    IncorrectStateVariant,
    UnsupportedForkVariant(String),
    BadConversion(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PayloadStatusV1Status {
    Valid,
    Invalid,
    Syncing,
    Accepted,
    InvalidBlockHash,
}

/// The raw payload status reported by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct PayloadStatusV1 {
    pub status: PayloadStatusV1Status,
    pub latest_valid_hash: Option<ExecutionBlockHash>,
    pub validation_error: Option<String>,
}

/// The forkchoice view handed to the engine: head, safe and finalized
/// execution block hashes, all on the canonical chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkchoiceState {
    pub head_block_hash: ExecutionBlockHash,
    pub safe_block_hash: ExecutionBlockHash,
    pub finalized_block_hash: ExecutionBlockHash,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForkchoiceUpdatedResponse {
    pub payload_status: PayloadStatusV1,
    pub payload_id: Option<PayloadId>,
}

/// The engine RPC surface the coordinator consumes.
///
/// Implementations choose the concrete protocol version from the fork of
/// the inputs. Cancellation is by future drop.
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// Maps to the `engine_forkchoiceUpdated` family of JSON-RPC calls.
    async fn forkchoice_updated(
        &self,
        forkchoice_state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<ForkchoiceUpdatedResponse, Error>;

    /// Maps to the `engine_newPayload` family of JSON-RPC calls.
    ///
    /// `versioned_hashes` and `parent_beacon_block_root` are supplied at
    /// Deneb and beyond, `execution_requests` at Electra and beyond.
    async fn new_payload(
        &self,
        payload: ExecutionPayloadSummary,
        versioned_hashes: Option<Vec<VersionedHash>>,
        parent_beacon_block_root: Option<Hash256>,
        execution_requests: Option<ExecutionRequests>,
    ) -> Result<PayloadStatusV1, Error>;
}
