//! Coordinates the beacon chain's view of the head with an external
//! execution engine: forkchoice updates, new-payload verification,
//! invalid-head pruning and payload-attribute preparation for proposals.
//!
//! The engine itself, the fork-choice store and the block/state/blob stores
//! are external collaborators reached through the traits defined here.

use slog::{debug, error, info, warn, Logger};
use slot_clock::SlotClock;
use std::marker::PhantomData;
use std::sync::Arc;
use types::{
    Address, BeaconBlockSummary, BeaconStateSummary, EthSpec, ExecutionBlockHash,
    ExecutionPayloadSummary, ForkName, Hash256, KzgCommitment, Slot, Withdrawal,
};

pub use engine_api::{
    EngineApi, Error as EngineApiError, ForkchoiceState, ForkchoiceUpdatedResponse, PayloadId,
    PayloadStatusV1, PayloadStatusV1Status,
};
pub use payload_attributes::{
    PayloadAttributes, PayloadAttributesV1, PayloadAttributesV2, PayloadAttributesV3,
};
pub use payload_id_cache::PayloadIdCache;
pub use payload_status::{process_payload_status, PayloadStatus};

mod engine_api;
mod metrics;
mod payload_attributes;
mod payload_id_cache;
mod payload_status;
pub mod test_utils;

/// The hash handed to fork choice when an engine reports INVALID without
/// naming the deepest valid ancestor.
fn default_latest_valid_hash() -> ExecutionBlockHash {
    ExecutionBlockHash::repeat_byte(0xff)
}

#[derive(Debug)]
pub enum Error {
    /// The execution layer rejected a payload. Carries enough context for
    /// the caller to feed the pruning path.
    InvalidPayload(InvalidityRecord),
    /// The engine returned neither a known status nor a clean success.
    /// Transient; no state was mutated.
    UndefinedEngineError(EngineApiError),
    ForkChoice(String),
    Store(String),
    MissingBlock(Hash256),
    MissingState(Hash256),
    PayloadNotPresent(Hash256),
}

/// Surfaced upward when the engine reports an invalid payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvalidityRecord {
    /// The root the caller submitted, when known.
    pub root: Option<Hash256>,
    /// The deepest still-valid ancestor the engine reported (or the
    /// sentinel when it reported none).
    pub latest_valid_hash: Option<ExecutionBlockHash>,
    /// The roots fork choice invalidated: the head plus its descendants.
    pub invalid_ancestor_roots: Vec<Hash256>,
    /// The payload id obtained for the recovered head, if recovery reached
    /// a head the engine accepted with attributes.
    pub recovered_payload_id: Option<PayloadId>,
}

/// The fork-choice store operations this crate consumes. The store is
/// externally synchronized.
pub trait ForkChoiceStore: Send + Sync {
    fn finalized_payload_block_hash(&self) -> ExecutionBlockHash;
    fn unrealized_justified_payload_block_hash(&self) -> ExecutionBlockHash;
    fn set_optimistic_to_valid(&self, root: Hash256) -> Result<(), String>;
    /// Marks `root` invalid with respect to `parent_root` and
    /// `latest_valid_hash`, returning every root that became invalid (the
    /// head plus descendants).
    fn set_optimistic_to_invalid(
        &self,
        root: Hash256,
        parent_root: Hash256,
        latest_valid_hash: ExecutionBlockHash,
    ) -> Result<Vec<Hash256>, String>;
    fn head(&self) -> Result<Hash256, String>;
}

/// Block and state storage. `delete_block` cascades to the stored state.
pub trait BeaconStore: Send + Sync {
    fn get_block(&self, root: Hash256) -> Result<Option<BeaconBlockSummary>, String>;
    fn delete_block(&self, root: Hash256) -> Result<(), String>;
    fn state_by_root(&self, root: Hash256) -> Result<Option<BeaconStateSummary>, String>;
    fn delete_state_from_caches(&self, root: Hash256) -> Result<(), String>;
    /// Persists `root` as the canonical head pointer.
    fn save_head(
        &self,
        root: Hash256,
        block: &BeaconBlockSummary,
        state: &BeaconStateSummary,
    ) -> Result<(), String>;
}

pub trait BlobStorage: Send + Sync {
    fn remove(&self, root: Hash256) -> Result<(), String>;
}

/// Knows which proposers this node prepares payloads for, and their fee
/// recipients. Backed by the validator registrations.
pub trait ProposerTracker: Send + Sync {
    fn tracked_proposer(&self, state: &BeaconStateSummary, slot: Slot) -> Option<TrackedValidator>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackedValidator {
    pub fee_recipient: Address,
}

/// The slice of the state-transition machinery the attribute builder needs.
pub trait StateProcessor: Send + Sync {
    /// Advances `state` to `slot`, reusing the next-slot cache where
    /// possible.
    fn process_slots_using_next_slot_cache(
        &self,
        state: BeaconStateSummary,
        head_root: Hash256,
        slot: Slot,
    ) -> Result<BeaconStateSummary, String>;

    /// The withdrawals the next payload built on `state` must contain.
    fn expected_withdrawals(&self, state: &BeaconStateSummary) -> Result<Vec<Withdrawal>, String>;
}

/// Everything the coordinator needs at construction.
pub struct Config<S> {
    pub engine: Arc<dyn EngineApi>,
    pub fork_choice: Arc<dyn ForkChoiceStore>,
    pub store: Arc<dyn BeaconStore>,
    pub blob_storage: Arc<dyn BlobStorage>,
    pub proposer_tracker: Arc<dyn ProposerTracker>,
    pub state_processor: Arc<dyn StateProcessor>,
    pub slot_clock: S,
    pub genesis_block_root: Hash256,
    /// When set, payloads are prepared for every slot and a missing payload
    /// id on a VALID response is expected rather than a misbehaviour
    /// signal.
    pub prepare_all_payloads: bool,
}

/// The arguments of a single forkchoice update.
#[derive(Clone, Debug)]
pub struct ForkchoiceUpdateParams {
    pub head_block: BeaconBlockSummary,
    pub head_root: Hash256,
    pub head_state: BeaconStateSummary,
    /// `None` requests no payload build this slot.
    pub attributes: Option<PayloadAttributes>,
}

struct Inner<S> {
    engine: Arc<dyn EngineApi>,
    fork_choice: Arc<dyn ForkChoiceStore>,
    store: Arc<dyn BeaconStore>,
    blob_storage: Arc<dyn BlobStorage>,
    proposer_tracker: Arc<dyn ProposerTracker>,
    state_processor: Arc<dyn StateProcessor>,
    payload_id_cache: PayloadIdCache,
    slot_clock: S,
    genesis_block_root: Hash256,
    prepare_all_payloads: bool,
    log: Logger,
}

/// Drives the execution engine as the consensus head moves.
#[derive(Clone)]
pub struct ExecutionLayer<E: EthSpec, S: SlotClock> {
    inner: Arc<Inner<S>>,
    _phantom: PhantomData<E>,
}

impl<E: EthSpec, S: SlotClock> ExecutionLayer<E, S> {
    pub fn new(config: Config<S>, log: Logger) -> Self {
        let Config {
            engine,
            fork_choice,
            store,
            blob_storage,
            proposer_tracker,
            state_processor,
            slot_clock,
            genesis_block_root,
            prepare_all_payloads,
        } = config;
        Self {
            inner: Arc::new(Inner {
                engine,
                fork_choice,
                store,
                blob_storage,
                proposer_tracker,
                state_processor,
                payload_id_cache: PayloadIdCache::default(),
                slot_clock,
                genesis_block_root,
                prepare_all_payloads,
                log,
            }),
            _phantom: PhantomData,
        }
    }

    pub fn payload_id_cache(&self) -> &PayloadIdCache {
        &self.inner.payload_id_cache
    }

    fn log(&self) -> &Logger {
        &self.inner.log
    }

    /// Signals the engine that the fork choice head moved.
    ///
    /// Returns `Ok(None)` both when no payload build was requested and on
    /// non-fatal failures (nil or pre-transition head, engine transport
    /// errors): the consensus pipeline retries on the next block, so
    /// `Ok(None)` means "no-op, try again later", never success-with-id.
    ///
    /// When the engine reports INVALID the head is recovered in a bounded
    /// loop (prune, re-head, re-notify, save head) and the call returns
    /// `Err(Error::InvalidPayload(_))` describing the originally submitted
    /// head so the caller can attach the invalidity to that block. Each
    /// round strictly removes roots from fork choice, which bounds the loop
    /// by the depth of the pruned subtree.
    pub async fn notify_forkchoice_update(
        &self,
        params: ForkchoiceUpdateParams,
    ) -> Result<Option<PayloadId>, Error> {
        let ForkchoiceUpdateParams {
            mut head_block,
            mut head_root,
            mut head_state,
            attributes,
        } = params;

        // Set on the first INVALID response; reported to the caller once
        // the loop settles.
        let mut invalidity: Option<InvalidityRecord> = None;

        loop {
            // Must not call fork choice updated until the transition
            // conditions are met.
            let head_payload = match head_block.execution_payload {
                Some(payload) if head_block.is_execution_block() => payload,
                _ => return self.conclude(None, invalidity, head_root, &head_block, &head_state),
            };

            let forkchoice_state = ForkchoiceState {
                head_block_hash: head_payload.block_hash,
                safe_block_hash: self.inner.fork_choice.unrealized_justified_payload_block_hash(),
                finalized_block_hash: self.inner.fork_choice.finalized_payload_block_hash(),
            };

            let response = match self
                .inner
                .engine
                .forkchoice_updated(forkchoice_state, attributes.clone())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(
                        self.log(),
                        "Execution engine call failed";
                        "method" => "forkchoice_updated",
                        "error" => ?e
                    );
                    return self.conclude(None, invalidity, head_root, &head_block, &head_state);
                }
            };
            let payload_id = response.payload_id;

            let status = match process_payload_status(
                head_payload.block_hash,
                response.payload_status,
                self.log(),
            ) {
                Ok(status) => status,
                Err(e) => {
                    error!(
                        self.log(),
                        "Undefined execution engine error";
                        "method" => "forkchoice_updated",
                        "error" => ?e
                    );
                    return self.conclude(None, invalidity, head_root, &head_block, &head_state);
                }
            };

            match status {
                PayloadStatus::Syncing | PayloadStatus::Accepted => {
                    metrics::inc_counter(&metrics::FORKCHOICE_UPDATED_OPTIMISTIC_NODE_COUNT);
                    info!(
                        self.log(),
                        "Called fork choice updated with optimistic block";
                        "head_slot" => %head_block.slot,
                        "head_payload_block_hash" => %head_payload.block_hash,
                        "finalized_payload_block_hash" => %forkchoice_state.finalized_block_hash
                    );
                    return self.conclude(
                        payload_id,
                        invalidity,
                        head_root,
                        &head_block,
                        &head_state,
                    );
                }
                PayloadStatus::Valid => {
                    metrics::inc_counter(&metrics::FORKCHOICE_UPDATED_VALID_NODE_COUNT);
                    if let Err(e) = self.inner.fork_choice.set_optimistic_to_valid(head_root) {
                        error!(
                            self.log(),
                            "Could not set head root to valid";
                            "error" => %e
                        );
                        return self.conclude(None, invalidity, head_root, &head_block, &head_state);
                    }
                    // If the call carried an attribute, remember the
                    // payload id for the proposer path.
                    if attributes.is_some() {
                        if let Some(payload_id) = payload_id {
                            match self.inner.slot_clock.now() {
                                Some(current_slot) => {
                                    info!(
                                        self.log(),
                                        "Forkchoice updated with payload attributes for proposal";
                                        "block_root" => %head_root,
                                        "head_slot" => %head_block.slot,
                                        "payload_id" => ?payload_id
                                    );
                                    self.inner.payload_id_cache.insert(
                                        current_slot + 1,
                                        head_root,
                                        payload_id,
                                    );
                                }
                                None => {
                                    error!(
                                        self.log(),
                                        "Could not read slot clock to cache payload ID"
                                    );
                                }
                            }
                        } else if !self.inner.prepare_all_payloads {
                            error!(
                                self.log(),
                                "Received nil payload ID on VALID engine response";
                                "block_hash" => %head_payload.block_hash,
                                "slot" => %head_block.slot
                            );
                        }
                    }
                    return self.conclude(
                        payload_id,
                        invalidity,
                        head_root,
                        &head_block,
                        &head_state,
                    );
                }
                PayloadStatus::Invalid {
                    latest_valid_hash, ..
                } => {
                    metrics::inc_counter(&metrics::FORKCHOICE_UPDATED_INVALID_NODE_COUNT);
                    // An engine with no valid ancestor to report sends an
                    // empty hash; fork choice expects the sentinel.
                    let latest_valid_hash =
                        latest_valid_hash.unwrap_or_else(default_latest_valid_hash);

                    let invalid_roots = match self.inner.fork_choice.set_optimistic_to_invalid(
                        head_root,
                        head_block.parent_root,
                        latest_valid_hash,
                    ) {
                        Ok(roots) => roots,
                        Err(e) => {
                            error!(
                                self.log(),
                                "Could not set head root to invalid";
                                "error" => %e
                            );
                            return self.conclude(
                                None,
                                invalidity,
                                head_root,
                                &head_block,
                                &head_state,
                            );
                        }
                    };
                    if let Err(e) = self.remove_invalid_block_and_state(&invalid_roots) {
                        error!(
                            self.log(),
                            "Could not remove invalid block and state";
                            "error" => ?e
                        );
                        return self.conclude(None, invalidity, head_root, &head_block, &head_state);
                    }

                    if invalidity.is_none() {
                        invalidity = Some(InvalidityRecord {
                            root: Some(head_root),
                            latest_valid_hash: Some(latest_valid_hash),
                            invalid_ancestor_roots: invalid_roots.clone(),
                            recovered_payload_id: None,
                        });
                    }

                    let new_head_root = match self.inner.fork_choice.head() {
                        Ok(root) => root,
                        Err(e) => {
                            warn!(
                                self.log(),
                                "Pruned invalid blocks, could not update head root";
                                "slot" => %head_block.slot,
                                "block_root" => %head_root,
                                "invalid_children_count" => invalid_roots.len(),
                                "error" => %e
                            );
                            return Err(Error::InvalidPayload(invalidity.unwrap_or_default()));
                        }
                    };
                    let new_head_block = match self.inner.store.get_block(new_head_root) {
                        Ok(Some(block)) => block,
                        Ok(None) | Err(_) => {
                            error!(
                                self.log(),
                                "Could not get head block";
                                "block_root" => %new_head_root
                            );
                            return self.conclude(
                                None,
                                invalidity,
                                head_root,
                                &head_block,
                                &head_state,
                            );
                        }
                    };
                    let new_head_state = match self.inner.store.state_by_root(new_head_root) {
                        Ok(Some(state)) => state,
                        Ok(None) | Err(_) => {
                            error!(
                                self.log(),
                                "Could not get head state";
                                "block_root" => %new_head_root
                            );
                            return self.conclude(
                                None,
                                invalidity,
                                head_root,
                                &head_block,
                                &head_state,
                            );
                        }
                    };

                    warn!(
                        self.log(),
                        "Pruned invalid blocks";
                        "slot" => %head_block.slot,
                        "block_root" => %head_root,
                        "invalid_children_count" => invalid_roots.len(),
                        "new_head_root" => %new_head_root
                    );

                    head_block = new_head_block;
                    head_state = new_head_state;
                    head_root = new_head_root;
                }
                PayloadStatus::InvalidBlockHash { .. } => {
                    error!(
                        self.log(),
                        "Undefined execution engine error";
                        "method" => "forkchoice_updated",
                        "status" => "invalid_block_hash"
                    );
                    return self.conclude(None, invalidity, head_root, &head_block, &head_state);
                }
            }
        }
    }

    /// Ends a forkchoice update. When invalid-head recovery ran, the
    /// recovered head is persisted and the caller receives the invalidity
    /// record for the head it submitted.
    fn conclude(
        &self,
        payload_id: Option<PayloadId>,
        invalidity: Option<InvalidityRecord>,
        head_root: Hash256,
        head_block: &BeaconBlockSummary,
        head_state: &BeaconStateSummary,
    ) -> Result<Option<PayloadId>, Error> {
        match invalidity {
            None => Ok(payload_id),
            Some(mut record) => {
                record.recovered_payload_id = payload_id;
                if let Err(e) = self.inner.store.save_head(head_root, head_block, head_state) {
                    error!(
                        self.log(),
                        "Could not save head after pruning invalid blocks";
                        "error" => %e
                    );
                }
                Err(Error::InvalidPayload(record))
            }
        }
    }

    /// Submits an incoming block's payload to the engine.
    ///
    /// Returns `Ok(true)` when the execution layer holds the block valid
    /// (pre-merge blocks are unconditionally valid), `Ok(false)` when the
    /// block was imported optimistically, and `Err(InvalidPayload(_))` when
    /// the engine rejected it. Pruning on rejection is the caller's call,
    /// via [`Self::prune_invalid_block`].
    pub async fn notify_new_payload(
        &self,
        pre_state_version: ForkName,
        pre_state_header: &ExecutionPayloadSummary,
        block: &BeaconBlockSummary,
    ) -> Result<bool, Error> {
        // Execution payloads are only supported in Bellatrix and beyond.
        // Pre-merge blocks are never optimistic.
        if pre_state_version < ForkName::Bellatrix {
            return Ok(true);
        }
        if !is_execution_enabled(pre_state_header, block) {
            return Ok(true);
        }
        // A post-transition block without a payload is malformed.
        let payload = block
            .execution_payload
            .ok_or_else(|| Error::InvalidPayload(InvalidityRecord::default()))?;

        let mut versioned_hashes = None;
        let mut parent_beacon_block_root = None;
        if block.fork_name >= ForkName::Deneb {
            versioned_hashes = Some(
                block
                    .blob_kzg_commitments
                    .iter()
                    .map(KzgCommitment::calculate_versioned_hash)
                    .collect(),
            );
            parent_beacon_block_root = Some(block.parent_root);
        }
        let execution_requests = if block.fork_name >= ForkName::Electra {
            block.execution_requests.clone()
        } else {
            None
        };

        let response = self
            .inner
            .engine
            .new_payload(
                payload,
                versioned_hashes,
                parent_beacon_block_root,
                execution_requests,
            )
            .await
            .map_err(Error::UndefinedEngineError)?;

        let status = process_payload_status(payload.block_hash, response, self.log())
            .map_err(Error::UndefinedEngineError)?;

        match status {
            PayloadStatus::Valid => {
                metrics::inc_counter(&metrics::NEW_PAYLOAD_VALID_NODE_COUNT);
                Ok(true)
            }
            PayloadStatus::Syncing | PayloadStatus::Accepted => {
                metrics::inc_counter(&metrics::NEW_PAYLOAD_OPTIMISTIC_NODE_COUNT);
                info!(
                    self.log(),
                    "Called new payload with optimistic block";
                    "slot" => %block.slot,
                    "payload_block_hash" => %payload.block_hash
                );
                Ok(false)
            }
            PayloadStatus::Invalid {
                latest_valid_hash, ..
            } => Err(Error::InvalidPayload(InvalidityRecord {
                root: None,
                latest_valid_hash,
                invalid_ancestor_roots: vec![],
                recovered_payload_id: None,
            })),
            PayloadStatus::InvalidBlockHash { validation_error } => {
                Err(Error::UndefinedEngineError(EngineApiError::BadResponse(
                    format!(
                        "new_payload: unexpected INVALID_BLOCK_HASH status: {:?}",
                        validation_error
                    ),
                )))
            }
        }
    }

    /// Prunes `root` and its descendants after the execution layer rejected
    /// its payload.
    ///
    /// Always returns an `InvalidPayload` error carrying the invalidity
    /// record, so the caller can decide what to do with the prior head.
    pub fn prune_invalid_block(
        &self,
        root: Hash256,
        parent_root: Hash256,
        latest_valid_hash: ExecutionBlockHash,
    ) -> Result<(), Error> {
        metrics::inc_counter(&metrics::NEW_PAYLOAD_INVALID_NODE_COUNT);
        let invalid_roots = self
            .inner
            .fork_choice
            .set_optimistic_to_invalid(root, parent_root, latest_valid_hash)
            .map_err(Error::ForkChoice)?;
        self.remove_invalid_block_and_state(&invalid_roots)?;
        warn!(
            self.log(),
            "Pruned invalid blocks";
            "block_root" => %root,
            "invalid_children_count" => invalid_roots.len()
        );
        Err(Error::InvalidPayload(InvalidityRecord {
            root: Some(root),
            latest_valid_hash: Some(latest_valid_hash),
            invalid_ancestor_roots: invalid_roots,
            recovered_payload_id: None,
        }))
    }

    /// The execution block hash of the block at `root`, or the zero hash
    /// for pre-Bellatrix blocks. The zero root maps to the genesis block.
    pub fn get_payload_hash(&self, root: Hash256) -> Result<ExecutionBlockHash, Error> {
        let root = self.ensure_root_not_zeros(root);
        let block = self
            .inner
            .store
            .get_block(root)
            .map_err(Error::Store)?
            .ok_or(Error::MissingBlock(root))?;
        if !block.fork_name.execution_enabled() {
            return Ok(ExecutionBlockHash::zero());
        }
        block
            .execution_payload
            .map(|payload| payload.block_hash)
            .ok_or(Error::PayloadNotPresent(root))
    }

    /// Builds the payload attributes for a potential proposal at `slot` on
    /// top of `head_root`, or `None` when no tracked proposer is due or any
    /// helper fails. Failures are logged, never propagated: a missed
    /// attribute only costs a proposal preparation.
    pub fn get_payload_attribute(
        &self,
        state: &BeaconStateSummary,
        slot: Slot,
        head_root: Hash256,
    ) -> Option<PayloadAttributes> {
        let epoch = slot.epoch(E::slots_per_epoch());
        let state_epoch = state.slot.epoch(E::slots_per_epoch());

        // If `slot` is past an epoch boundary the shuffling changes with
        // the slot advance, so the proposer check must wait until after it.
        // Otherwise perform it up front; the next-slot cache makes the
        // later advance cheap.
        let mut proposer = None;
        if epoch <= state_epoch {
            proposer = Some(self.inner.proposer_tracker.tracked_proposer(state, slot)?);
        }

        let mut state = state.clone();
        if slot > state.slot {
            state = match self.inner.state_processor.process_slots_using_next_slot_cache(
                state,
                head_root,
                slot,
            ) {
                Ok(state) => state,
                Err(e) => {
                    error!(
                        self.log(),
                        "Could not process slots to get payload attribute";
                        "error" => %e
                    );
                    return None;
                }
            };
        }
        if epoch > state_epoch {
            proposer = Some(self.inner.proposer_tracker.tracked_proposer(&state, slot)?);
        }
        let proposer = proposer?;

        let prev_randao = state.randao_mix;
        let timestamp = match self.inner.slot_clock.timestamp_at_slot(slot) {
            Some(timestamp) => timestamp,
            None => {
                error!(self.log(), "Could not get timestamp to get payload attribute");
                return None;
            }
        };

        if !state.fork_name.execution_enabled() {
            error!(
                self.log(),
                "Could not get payload attribute due to pre-execution state";
                "fork" => %state.fork_name
            );
            return None;
        }

        let withdrawals = if state.fork_name >= ForkName::Capella {
            match self.inner.state_processor.expected_withdrawals(&state) {
                Ok(withdrawals) => Some(withdrawals),
                Err(e) => {
                    error!(
                        self.log(),
                        "Could not get expected withdrawals to get payload attribute";
                        "error" => %e
                    );
                    return None;
                }
            }
        } else {
            None
        };
        let parent_beacon_block_root = (state.fork_name >= ForkName::Deneb).then_some(head_root);

        match PayloadAttributes::new(
            state.fork_name,
            timestamp,
            prev_randao,
            proposer.fee_recipient,
            withdrawals,
            parent_beacon_block_root,
        ) {
            Ok(attributes) => Some(attributes),
            Err(e) => {
                error!(
                    self.log(),
                    "Could not get payload attribute";
                    "error" => ?e
                );
                None
            }
        }
    }

    /// Removes pruned roots from the state caches, the block store and the
    /// blob store, in that order, so an interruption leaves no blob entries
    /// pointing at live blocks.
    fn remove_invalid_block_and_state(&self, roots: &[Hash256]) -> Result<(), Error> {
        for root in roots {
            self.inner
                .store
                .delete_state_from_caches(*root)
                .map_err(Error::Store)?;
            // Deleting the block also deletes the state.
            self.inner.store.delete_block(*root).map_err(Error::Store)?;
            if let Err(e) = self.inner.blob_storage.remove(*root) {
                // Blobs may not exist for some blocks, leading to deletion
                // failures.
                debug!(
                    self.log(),
                    "Could not remove blob from blob storage";
                    "error" => %e
                );
            }
        }
        Ok(())
    }

    fn ensure_root_not_zeros(&self, root: Hash256) -> Hash256 {
        if root.is_zero() {
            self.inner.genesis_block_root
        } else {
            root
        }
    }
}

/// Whether the merge transition is complete (non-empty pre-state header) or
/// completing (the block carries the transition payload).
fn is_execution_enabled(header: &ExecutionPayloadSummary, block: &BeaconBlockSummary) -> bool {
    !header.is_empty()
        || block
            .execution_payload
            .map_or(false, |payload| !payload.is_empty())
}
