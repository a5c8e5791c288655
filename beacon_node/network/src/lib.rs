//! Manages this node's participation in attestation and sync-committee
//! subnets: which subnets to join, what the routable record advertises,
//! and how peers for those subnets are discovered and dialed.
//!
//! The discovery listener, the pubsub router and the transport dialer are
//! external collaborators reached through the traits defined here.

use parking_lot::{Mutex, RwLock};
use slog::{o, Logger};
use ssz::Encode;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use superstruct::superstruct;
use types::{
    ChainSpec, EnrAttestationBitfield, EnrSyncCommitteeBitfield, Epoch, EthSpec, SubnetId, Uint256,
};

pub use config::NetworkConfig;
pub use discovery::{attestation_subnet_predicate, sync_committee_subnet_predicate};
pub use discv5::enr::NodeId;
pub use discv5::Enr;
pub use libp2p::{Multiaddr, PeerId};
pub use subnets::{
    att_subnets, sync_subnets, AttestationBitfieldEntry, SyncCommitteeBitfieldEntry,
    ATTESTATION_BITFIELD_ENR_KEY, SYNC_COMMITTEE_BITFIELD_ENR_KEY,
};

mod config;
mod discovery;
mod metrics;
mod subnets;
#[cfg(test)]
pub(crate) mod test_utils;

/// Gossip topics containing this string shard attestations.
pub const GOSSIP_ATTESTATION_MESSAGE: &str = "beacon_attestation";
/// Gossip topics containing this string shard sync committee messages.
pub const GOSSIP_SYNC_COMMITTEE_MESSAGE: &str = "sync_committee";

/// Key offset for sync committee subnets in the shared subnet locker.
/// Deliberately larger than the attestation subnet count.
pub const SYNC_SUBNET_LOCKER_OFFSET: u64 = 100;
/// Key offset for blob sidecar subnets in the shared subnet locker.
/// Deliberately larger than the sync and attestation subnet counts
/// combined.
pub const BLOB_SUBNET_LOCKER_OFFSET: u64 = 110;

#[derive(Debug)]
pub enum Error {
    /// The node runs without a discovery listener.
    DiscoveryDisabled,
    /// The topic does not shard into subnets.
    NoSubnetForTopic(String),
    /// The caller's deadline expired before the threshold was met.
    PeerSearchCancelled {
        topic: String,
        found: usize,
        needed: usize,
    },
    Enr(String),
    IncorrectMetaDataVariant,
    SubnetComputation(&'static str),
}

/// The discovery listener surface this crate consumes.
pub trait Discovery: Send + Sync {
    /// A fresh random-walk iterator over discovered records.
    fn random_nodes(&self) -> Box<dyn Iterator<Item = Enr> + Send>;

    /// The node's own routable record.
    fn local_enr(&self) -> Enr;

    /// Replaces `key` in the local record with `value` (the raw SSZ
    /// bitfield, stored as an RLP byte string) and re-signs the record.
    fn enr_insert(&self, key: &str, value: &[u8]) -> Result<(), String>;
}

/// Pubsub peer listing, per fully-suffixed topic.
pub trait TopicPeers: Send + Sync {
    fn list_peers(&self, topic: &str) -> Vec<PeerId>;
}

/// A dialable peer derived from a discovered record.
#[derive(Clone, Debug)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    pub multiaddrs: Vec<Multiaddr>,
}

/// Converts records to peer addresses and dials them. Both live with the
/// transport layer.
#[async_trait::async_trait]
pub trait PeerDialer: Send + Sync {
    /// `None` when the record carries no usable address.
    fn peer_info(&self, enr: &Enr) -> Option<PeerInfo>;

    async fn connect_with_peer(&self, info: PeerInfo) -> Result<(), String>;
}

/// The node metadata advertised to peers alongside the ENR.
///
/// `V1` predates sync committees; `V2` adds their bitfield.
#[superstruct(
    variants(V1, V2),
    variant_attributes(derive(Clone, Debug, PartialEq, ssz_derive::Encode, ssz_derive::Decode)),
    cast_error(ty = "Error", expr = "Error::IncorrectMetaDataVariant"),
    partial_getter_error(ty = "Error", expr = "Error::IncorrectMetaDataVariant")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct MetaData<E: EthSpec> {
    #[superstruct(getter(copy))]
    pub seq_number: u64,
    pub attnets: EnrAttestationBitfield<E>,
    #[superstruct(only(V2))]
    pub syncnets: EnrSyncCommitteeBitfield<E>,
}

impl<E: EthSpec> MetaData<E> {
    /// The wire encoding of the metadata blob.
    pub fn as_ssz_bytes(&self) -> Vec<u8> {
        match self {
            MetaData::V1(md) => md.as_ssz_bytes(),
            MetaData::V2(md) => md.as_ssz_bytes(),
        }
    }
}

/// A cached deterministic subnet assignment.
#[derive(Clone, Debug)]
struct PersistentSubnets {
    subnets: Vec<SubnetId>,
    expires_at: Instant,
}

/// Tracks and maintains this node's subnet participation.
pub struct SubnetService<E: EthSpec> {
    /// `None` when discovery is disabled.
    discovery: Option<Arc<dyn Discovery>>,
    pubsub: Arc<dyn TopicPeers>,
    dialer: Arc<dyn PeerDialer>,
    /// Guarded by a writer lock spanning record writes so that readers see
    /// the bitfields and the sequence number move together.
    meta_data: RwLock<MetaData<E>>,
    /// Lazily created per-subnet locks, shared across the attestation,
    /// sync and blob namespaces via the key offsets above.
    subnet_lockers: Mutex<HashMap<u64, Arc<RwLock<()>>>>,
    persistent_subnets: RwLock<Option<PersistentSubnets>>,
    pub config: NetworkConfig,
    spec: ChainSpec,
    log: Logger,
}

impl<E: EthSpec> SubnetService<E> {
    pub fn new(
        discovery: Option<Arc<dyn Discovery>>,
        pubsub: Arc<dyn TopicPeers>,
        dialer: Arc<dyn PeerDialer>,
        config: NetworkConfig,
        spec: ChainSpec,
        log: &Logger,
    ) -> Self {
        let log = log.new(o!("service" => "subnet_service"));
        SubnetService {
            discovery,
            pubsub,
            dialer,
            meta_data: RwLock::new(MetaData::V1(MetaDataV1 {
                seq_number: 0,
                attnets: EnrAttestationBitfield::<E>::default(),
            })),
            subnet_lockers: Mutex::new(HashMap::new()),
            persistent_subnets: RwLock::new(None),
            config,
            spec,
            log,
        }
    }

    pub(crate) fn discovery(&self) -> Option<&Arc<dyn Discovery>> {
        self.discovery.as_ref()
    }

    pub(crate) fn pubsub(&self) -> &Arc<dyn TopicPeers> {
        &self.pubsub
    }

    pub(crate) fn dialer(&self) -> &Arc<dyn PeerDialer> {
        &self.dialer
    }

    pub(crate) fn log(&self) -> &Logger {
        &self.log
    }

    /// The currently advertised metadata.
    pub fn meta_data(&self) -> MetaData<E> {
        self.meta_data.read().clone()
    }

    /// Writes default (zero) attestation bitfield entries into the local
    /// record. Called once at startup.
    pub fn initialize_att_subnets(&self) -> Result<(), Error> {
        let discovery = self.discovery.as_ref().ok_or(Error::DiscoveryDisabled)?;
        let bitfield = EnrAttestationBitfield::<E>::default();
        discovery
            .enr_insert(ATTESTATION_BITFIELD_ENR_KEY, &bitfield.as_ssz_bytes())
            .map_err(Error::Enr)
    }

    /// Writes default (zero) sync committee bitfield entries into the
    /// local record. Called once the sync fork is scheduled.
    pub fn initialize_sync_subnets(&self) -> Result<(), Error> {
        let discovery = self.discovery.as_ref().ok_or(Error::DiscoveryDisabled)?;
        let bitfield = EnrSyncCommitteeBitfield::<E>::default();
        discovery
            .enr_insert(SYNC_COMMITTEE_BITFIELD_ENR_KEY, &bitfield.as_ssz_bytes())
            .map_err(Error::Enr)
    }

    /// Replaces the advertised attestation bitfield and bumps the metadata
    /// sequence number. Readers observe the old record or the new one,
    /// never a mix.
    pub fn update_subnet_record_with_metadata(
        &self,
        attnets: EnrAttestationBitfield<E>,
    ) -> Result<(), Error> {
        let discovery = self.discovery.as_ref().ok_or(Error::DiscoveryDisabled)?;
        let mut meta_data = self.meta_data.write();
        discovery
            .enr_insert(ATTESTATION_BITFIELD_ENR_KEY, &attnets.as_ssz_bytes())
            .map_err(Error::Enr)?;
        *meta_data = MetaData::V1(MetaDataV1 {
            seq_number: meta_data.seq_number() + 1,
            attnets,
        });
        Ok(())
    }

    /// Replaces both advertised bitfields and bumps the metadata sequence
    /// number, switching the metadata to `V2`.
    pub fn update_subnet_record_with_metadata_v2(
        &self,
        attnets: EnrAttestationBitfield<E>,
        syncnets: EnrSyncCommitteeBitfield<E>,
    ) -> Result<(), Error> {
        let discovery = self.discovery.as_ref().ok_or(Error::DiscoveryDisabled)?;
        let mut meta_data = self.meta_data.write();
        discovery
            .enr_insert(ATTESTATION_BITFIELD_ENR_KEY, &attnets.as_ssz_bytes())
            .map_err(Error::Enr)?;
        discovery
            .enr_insert(SYNC_COMMITTEE_BITFIELD_ENR_KEY, &syncnets.as_ssz_bytes())
            .map_err(Error::Enr)?;
        *meta_data = MetaData::V2(MetaDataV2 {
            seq_number: meta_data.seq_number() + 1,
            attnets,
            syncnets,
        });
        Ok(())
    }

    /// The node's deterministic subnet assignment for the subscription
    /// window containing `epoch`, recomputed only when the cached one has
    /// expired.
    pub fn initialize_persistent_subnets(
        &self,
        node_id: NodeId,
        epoch: Epoch,
    ) -> Result<Vec<SubnetId>, Error> {
        if let Some(cached) = self.persistent_subnets.read().as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.subnets.clone());
            }
        }

        let node_id = Uint256::from_big_endian(&node_id.raw());
        let subnets = SubnetId::compute_subnets_for_epoch::<E>(node_id, epoch, &self.spec)
            .map_err(Error::SubnetComputation)?;
        let expires_at = Instant::now()
            + SubnetId::compute_subscription_expiration::<E>(node_id, epoch, &self.spec);
        *self.persistent_subnets.write() = Some(PersistentSubnets {
            subnets: subnets.clone(),
            expires_at,
        });
        Ok(subnets)
    }

    /// The lock guarding work on an attestation subnet.
    pub fn attestation_subnet_locker(&self, subnet_id: u64) -> Arc<RwLock<()>> {
        self.subnet_locker(subnet_id)
    }

    /// The lock guarding work on a sync committee subnet.
    pub fn sync_subnet_locker(&self, subnet_id: u64) -> Arc<RwLock<()>> {
        self.subnet_locker(subnet_id + SYNC_SUBNET_LOCKER_OFFSET)
    }

    /// The lock guarding work on a blob sidecar subnet.
    pub fn blob_subnet_locker(&self, subnet_id: u64) -> Arc<RwLock<()>> {
        self.subnet_locker(subnet_id + BLOB_SUBNET_LOCKER_OFFSET)
    }

    /// One locker map serves every subnet namespace; the offsets keep the
    /// key spaces disjoint.
    fn subnet_locker(&self, key: u64) -> Arc<RwLock<()>> {
        let mut lockers = self.subnet_lockers.lock();
        lockers.entry(key).or_default().clone()
    }

    /// Whether enough pubsub peers exist on `topic` to broadcast.
    ///
    /// A lower bar than a peer search, so that an attestation can still go
    /// out under poor connectivity.
    pub fn has_peer_with_subnet(&self, topic: &str) -> bool {
        let min_peers = std::cmp::min(1, self.config.min_peers_per_subnet);
        let topic = format!("{}{}", topic, self.config.protocol_suffix);
        self.pubsub.list_peers(&topic).len() >= min_peers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use types::MainnetEthSpec;

    type E = MainnetEthSpec;

    #[test]
    fn metadata_starts_at_v1_seq_zero() {
        let rig = TestRig::new();
        let meta_data = rig.service.meta_data();
        assert!(matches!(meta_data, MetaData::V1(_)));
        assert_eq!(meta_data.seq_number(), 0);
    }

    #[test]
    fn record_update_bumps_sequence_number() {
        let rig = TestRig::new();
        let mut first = EnrAttestationBitfield::<E>::default();
        first.set(7, true).unwrap();
        let mut second = EnrAttestationBitfield::<E>::default();
        second.set(9, true).unwrap();

        rig.service
            .update_subnet_record_with_metadata(first.clone())
            .unwrap();
        let meta_data = rig.service.meta_data();
        assert_eq!(meta_data.seq_number(), 1);
        assert_eq!(meta_data.attnets(), &first);

        rig.service
            .update_subnet_record_with_metadata(second.clone())
            .unwrap();
        let meta_data = rig.service.meta_data();
        assert_eq!(meta_data.seq_number(), 2);
        assert_eq!(meta_data.attnets(), &second);

        // The record advertises the same bitfield the metadata carries.
        let enr = rig.discovery.local_enr();
        assert_eq!(att_subnets::<E>(&enr).unwrap(), second);
    }

    #[test]
    fn v2_record_update_switches_metadata_version() {
        let rig = TestRig::new();
        let mut attnets = EnrAttestationBitfield::<E>::default();
        attnets.set(1, true).unwrap();
        let mut syncnets = EnrSyncCommitteeBitfield::<E>::default();
        syncnets.set(2, true).unwrap();

        rig.service
            .update_subnet_record_with_metadata_v2(attnets.clone(), syncnets.clone())
            .unwrap();

        let meta_data = rig.service.meta_data();
        assert!(matches!(meta_data, MetaData::V2(_)));
        assert_eq!(meta_data.seq_number(), 1);
        assert_eq!(meta_data.attnets(), &attnets);

        let enr = rig.discovery.local_enr();
        assert_eq!(att_subnets::<E>(&enr).unwrap(), attnets);
        assert_eq!(sync_subnets::<E>(&enr).unwrap(), vec![2]);
    }

    // Observers must never see a new bitfield with an old sequence number:
    // the bitfield and the sequence number always move together.
    #[test]
    fn metadata_observers_see_consistent_pairs() {
        let rig = TestRig::new();
        let mut bitfields = vec![];
        for i in 0..4u64 {
            let mut bitfield = EnrAttestationBitfield::<E>::default();
            bitfield.set(i as usize, true).unwrap();
            bitfields.push(bitfield);
        }
        for (i, bitfield) in bitfields.iter().enumerate() {
            rig.service
                .update_subnet_record_with_metadata(bitfield.clone())
                .unwrap();
            let meta_data = rig.service.meta_data();
            assert_eq!(meta_data.seq_number(), i as u64 + 1);
            assert_eq!(meta_data.attnets(), bitfield);
        }
    }

    #[test]
    fn record_updates_require_discovery() {
        let rig = TestRig::without_discovery();
        let result =
            rig.service
                .update_subnet_record_with_metadata(EnrAttestationBitfield::<E>::default());
        assert!(matches!(result, Err(Error::DiscoveryDisabled)));
    }

    #[test]
    fn subnet_locker_namespaces_are_disjoint() {
        let rig = TestRig::new();
        let attestation = rig.service.attestation_subnet_locker(3);
        let sync = rig.service.sync_subnet_locker(3);
        let blob = rig.service.blob_subnet_locker(3);

        // Same id, different namespaces: three distinct locks.
        assert!(!Arc::ptr_eq(&attestation, &sync));
        assert!(!Arc::ptr_eq(&attestation, &blob));
        assert!(!Arc::ptr_eq(&sync, &blob));

        // Same key returns the identical lock.
        assert!(Arc::ptr_eq(
            &attestation,
            &rig.service.attestation_subnet_locker(3)
        ));
    }

    #[test]
    fn persistent_subnets_are_cached_until_expiry() {
        let rig = TestRig::new();
        let node_id = NodeId::random();
        let first = rig
            .service
            .initialize_persistent_subnets(node_id, Epoch::new(100))
            .unwrap();
        assert_eq!(first.len(), rig.service.spec.subnets_per_node as usize);
        // A second call inside the window serves the cache, even for a
        // different epoch argument.
        let second = rig
            .service
            .initialize_persistent_subnets(node_id, Epoch::new(101))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn metadata_blob_round_trips() {
        use ssz::{Decode, Encode};
        let mut attnets = EnrAttestationBitfield::<E>::default();
        attnets.set(5, true).unwrap();
        let mut syncnets = EnrSyncCommitteeBitfield::<E>::default();
        syncnets.set(1, true).unwrap();

        let meta_data = MetaDataV2::<E> {
            seq_number: 3,
            attnets,
            syncnets,
        };
        let bytes = meta_data.as_ssz_bytes();
        let decoded = MetaDataV2::<E>::from_ssz_bytes(&bytes).unwrap();
        assert_eq!(decoded, meta_data);
    }
}
