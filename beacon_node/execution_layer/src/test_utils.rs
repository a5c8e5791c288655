//! Scripted mock collaborators for testing the coordinator without an
//! execution engine or database.

use crate::engine_api::{
    EngineApi, Error as ApiError, ForkchoiceState, ForkchoiceUpdatedResponse, PayloadAttributes,
    PayloadStatusV1, PayloadStatusV1Status,
};
use crate::{
    BeaconStore, BlobStorage, ForkChoiceStore, ProposerTracker, StateProcessor, TrackedValidator,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use types::{
    BeaconBlockSummary, BeaconStateSummary, Epoch, EthSpec, ExecutionBlockHash,
    ExecutionPayloadSummary, ForkName, Hash256, Slot, VersionedHash, Withdrawal,
};

/// The arguments of one `new_payload` call, as seen by the engine.
#[derive(Clone, Debug)]
pub struct NewPayloadCall {
    pub payload: ExecutionPayloadSummary,
    pub versioned_hashes: Option<Vec<VersionedHash>>,
    pub parent_beacon_block_root: Option<Hash256>,
    pub execution_requests: Option<types::ExecutionRequests>,
}

/// An engine that replays scripted responses and records every call.
#[derive(Default)]
pub struct MockEngine {
    forkchoice_updated_responses: Mutex<VecDeque<Result<ForkchoiceUpdatedResponse, ApiError>>>,
    new_payload_responses: Mutex<VecDeque<Result<PayloadStatusV1, ApiError>>>,
    pub forkchoice_updated_calls: Mutex<Vec<(ForkchoiceState, Option<PayloadAttributes>)>>,
    pub new_payload_calls: Mutex<Vec<NewPayloadCall>>,
}

impl MockEngine {
    pub fn push_forkchoice_response(&self, response: Result<ForkchoiceUpdatedResponse, ApiError>) {
        self.forkchoice_updated_responses.lock().push_back(response);
    }

    pub fn push_new_payload_response(&self, response: Result<PayloadStatusV1, ApiError>) {
        self.new_payload_responses.lock().push_back(response);
    }

    /// A VALID forkchoice response for `head_hash`, optionally carrying a
    /// payload id.
    pub fn valid_forkchoice_response(
        head_hash: ExecutionBlockHash,
        payload_id: Option<[u8; 8]>,
    ) -> ForkchoiceUpdatedResponse {
        ForkchoiceUpdatedResponse {
            payload_status: PayloadStatusV1 {
                status: PayloadStatusV1Status::Valid,
                latest_valid_hash: Some(head_hash),
                validation_error: None,
            },
            payload_id,
        }
    }

    pub fn syncing_forkchoice_response() -> ForkchoiceUpdatedResponse {
        ForkchoiceUpdatedResponse {
            payload_status: PayloadStatusV1 {
                status: PayloadStatusV1Status::Syncing,
                latest_valid_hash: None,
                validation_error: None,
            },
            payload_id: None,
        }
    }

    pub fn invalid_forkchoice_response(
        latest_valid_hash: Option<ExecutionBlockHash>,
    ) -> ForkchoiceUpdatedResponse {
        ForkchoiceUpdatedResponse {
            payload_status: PayloadStatusV1 {
                status: PayloadStatusV1Status::Invalid,
                latest_valid_hash,
                validation_error: None,
            },
            payload_id: None,
        }
    }
}

#[async_trait]
impl EngineApi for MockEngine {
    async fn forkchoice_updated(
        &self,
        forkchoice_state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<ForkchoiceUpdatedResponse, ApiError> {
        self.forkchoice_updated_calls
            .lock()
            .push((forkchoice_state, payload_attributes));
        self.forkchoice_updated_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::RequestFailed("no scripted response".to_string())))
    }

    async fn new_payload(
        &self,
        payload: ExecutionPayloadSummary,
        versioned_hashes: Option<Vec<VersionedHash>>,
        parent_beacon_block_root: Option<Hash256>,
        execution_requests: Option<types::ExecutionRequests>,
    ) -> Result<PayloadStatusV1, ApiError> {
        self.new_payload_calls.lock().push(NewPayloadCall {
            payload,
            versioned_hashes,
            parent_beacon_block_root,
            execution_requests,
        });
        self.new_payload_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::RequestFailed("no scripted response".to_string())))
    }
}

/// A fork-choice store with scripted invalidation and head responses.
#[derive(Default)]
pub struct MockForkChoice {
    pub finalized_block_hash: Mutex<ExecutionBlockHash>,
    pub justified_block_hash: Mutex<ExecutionBlockHash>,
    pub valid_roots: Mutex<Vec<Hash256>>,
    pub invalidation_calls: Mutex<Vec<(Hash256, Hash256, ExecutionBlockHash)>>,
    invalidation_responses: Mutex<VecDeque<Result<Vec<Hash256>, String>>>,
    head_responses: Mutex<VecDeque<Result<Hash256, String>>>,
}

impl MockForkChoice {
    pub fn push_invalidation_response(&self, response: Result<Vec<Hash256>, String>) {
        self.invalidation_responses.lock().push_back(response);
    }

    pub fn push_head_response(&self, response: Result<Hash256, String>) {
        self.head_responses.lock().push_back(response);
    }
}

impl ForkChoiceStore for MockForkChoice {
    fn finalized_payload_block_hash(&self) -> ExecutionBlockHash {
        *self.finalized_block_hash.lock()
    }

    fn unrealized_justified_payload_block_hash(&self) -> ExecutionBlockHash {
        *self.justified_block_hash.lock()
    }

    fn set_optimistic_to_valid(&self, root: Hash256) -> Result<(), String> {
        self.valid_roots.lock().push(root);
        Ok(())
    }

    fn set_optimistic_to_invalid(
        &self,
        root: Hash256,
        parent_root: Hash256,
        latest_valid_hash: ExecutionBlockHash,
    ) -> Result<Vec<Hash256>, String> {
        self.invalidation_calls
            .lock()
            .push((root, parent_root, latest_valid_hash));
        self.invalidation_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted invalidation response".to_string()))
    }

    fn head(&self) -> Result<Hash256, String> {
        self.head_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted head response".to_string()))
    }
}

/// An in-memory block/state store that records deletions and head saves.
#[derive(Default)]
pub struct MemoryStore {
    blocks: Mutex<HashMap<Hash256, BeaconBlockSummary>>,
    states: Mutex<HashMap<Hash256, BeaconStateSummary>>,
    pub deleted_blocks: Mutex<Vec<Hash256>>,
    pub deleted_state_caches: Mutex<Vec<Hash256>>,
    pub saved_heads: Mutex<Vec<Hash256>>,
}

impl MemoryStore {
    pub fn insert_block(&self, root: Hash256, block: BeaconBlockSummary) {
        self.blocks.lock().insert(root, block);
    }

    pub fn insert_state(&self, root: Hash256, state: BeaconStateSummary) {
        self.states.lock().insert(root, state);
    }

    pub fn contains_block(&self, root: Hash256) -> bool {
        self.blocks.lock().contains_key(&root)
    }
}

impl BeaconStore for MemoryStore {
    fn get_block(&self, root: Hash256) -> Result<Option<BeaconBlockSummary>, String> {
        Ok(self.blocks.lock().get(&root).cloned())
    }

    fn delete_block(&self, root: Hash256) -> Result<(), String> {
        self.deleted_blocks.lock().push(root);
        self.blocks.lock().remove(&root);
        // Deleting a block cascades to its state.
        self.states.lock().remove(&root);
        Ok(())
    }

    fn state_by_root(&self, root: Hash256) -> Result<Option<BeaconStateSummary>, String> {
        Ok(self.states.lock().get(&root).cloned())
    }

    fn delete_state_from_caches(&self, root: Hash256) -> Result<(), String> {
        self.deleted_state_caches.lock().push(root);
        Ok(())
    }

    fn save_head(
        &self,
        root: Hash256,
        _block: &BeaconBlockSummary,
        _state: &BeaconStateSummary,
    ) -> Result<(), String> {
        self.saved_heads.lock().push(root);
        Ok(())
    }
}

/// Blob storage that errors for roots it does not hold, like the real one.
#[derive(Default)]
pub struct MemoryBlobStorage {
    blobs: Mutex<HashSet<Hash256>>,
    pub removed: Mutex<Vec<Hash256>>,
}

impl MemoryBlobStorage {
    pub fn insert_blob(&self, root: Hash256) {
        self.blobs.lock().insert(root);
    }
}

impl BlobStorage for MemoryBlobStorage {
    fn remove(&self, root: Hash256) -> Result<(), String> {
        if self.blobs.lock().remove(&root) {
            self.removed.lock().push(root);
            Ok(())
        } else {
            Err(format!("no blobs stored for root {:?}", root))
        }
    }
}

/// Tracks a single proposer from `from_epoch` onward (under the epoch of
/// the state it is asked about), recording the state slot of each query.
pub struct StaticProposerTracker<E: EthSpec> {
    pub from_epoch: Epoch,
    pub validator: TrackedValidator,
    pub queries: Mutex<Vec<Slot>>,
    _phantom: std::marker::PhantomData<E>,
}

impl<E: EthSpec> StaticProposerTracker<E> {
    pub fn new(from_epoch: Epoch, validator: TrackedValidator) -> Self {
        Self {
            from_epoch,
            validator,
            queries: Mutex::new(vec![]),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E: EthSpec> ProposerTracker for StaticProposerTracker<E> {
    fn tracked_proposer(&self, state: &BeaconStateSummary, _slot: Slot) -> Option<TrackedValidator> {
        self.queries.lock().push(state.slot);
        (state.slot.epoch(E::slots_per_epoch()) >= self.from_epoch).then_some(self.validator)
    }
}

/// A proposer tracker that tracks nobody.
pub struct NoProposerTracker;

impl ProposerTracker for NoProposerTracker {
    fn tracked_proposer(
        &self,
        _state: &BeaconStateSummary,
        _slot: Slot,
    ) -> Option<TrackedValidator> {
        None
    }
}

/// A state processor that advances the slot in place and serves configured
/// withdrawals.
#[derive(Default)]
pub struct SimpleStateProcessor {
    pub withdrawals: Vec<Withdrawal>,
    pub fail_slot_processing: bool,
    /// When set, states advanced into this fork's epoch change fork.
    pub fork_at_epoch: Option<(Epoch, ForkName, u64)>,
}

impl StateProcessor for SimpleStateProcessor {
    fn process_slots_using_next_slot_cache(
        &self,
        mut state: BeaconStateSummary,
        _head_root: Hash256,
        slot: Slot,
    ) -> Result<BeaconStateSummary, String> {
        if self.fail_slot_processing {
            return Err("scripted slot processing failure".to_string());
        }
        state.slot = slot;
        if let Some((epoch, fork, slots_per_epoch)) = self.fork_at_epoch {
            if slot.epoch(slots_per_epoch) >= epoch {
                state.fork_name = fork;
            }
        }
        Ok(state)
    }

    fn expected_withdrawals(&self, _state: &BeaconStateSummary) -> Result<Vec<Withdrawal>, String> {
        Ok(self.withdrawals.clone())
    }
}
