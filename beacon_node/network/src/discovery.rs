//! Searching for and dialing peers on a particular subnet.

use crate::metrics;
use crate::subnets::{att_subnets, sync_subnets};
use crate::{
    Error, SubnetService, GOSSIP_ATTESTATION_MESSAGE, GOSSIP_SYNC_COMMITTEE_MESSAGE,
};
use discv5::Enr;
use slog::debug;
use tokio_util::sync::CancellationToken;
use types::EthSpec;

/// Admits nodes whose record advertises attestation subnet `index`.
pub fn attestation_subnet_predicate<E: EthSpec>(index: u64) -> impl Fn(&Enr) -> bool {
    move |enr: &Enr| {
        att_subnets::<E>(enr)
            .ok()
            .and_then(|bitfield| bitfield.get(index as usize).ok())
            .unwrap_or(false)
    }
}

/// Admits nodes whose record advertises sync committee subnet `index`.
pub fn sync_committee_subnet_predicate<E: EthSpec>(index: u64) -> impl Fn(&Enr) -> bool {
    move |enr: &Enr| {
        sync_subnets::<E>(enr)
            .map(|subnets| subnets.contains(&index))
            .unwrap_or(false)
    }
}

impl<E: EthSpec> SubnetService<E> {
    /// Searches the discovery overlay for peers subscribed to a subnet and
    /// dials them until `threshold` pubsub peers exist on `topic`.
    ///
    /// Returns `Ok(false)` without searching when discovery is disabled,
    /// `Ok(true)` once the threshold is met, and an error when the topic
    /// does not shard into subnets or `cancel` fires first.
    ///
    /// Dials within a batch are concurrent with no ordering among
    /// themselves; the next batch only starts after the previous one has
    /// fully settled. Cancellation is observed between batches, so an
    /// iterator that never yields a matching node leaves this method
    /// waiting until the caller cancels.
    pub async fn find_peers_with_subnet(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        index: u64,
        threshold: usize,
    ) -> Result<bool, Error> {
        let discovery = match self.discovery() {
            Some(discovery) => discovery,
            None => return Ok(false),
        };
        metrics::inc_counter(&metrics::SUBNET_PEER_SEARCHES);

        let topic = format!("{}{}", topic, self.config.protocol_suffix);
        let predicate: Box<dyn Fn(&Enr) -> bool + Send> =
            if topic.contains(GOSSIP_ATTESTATION_MESSAGE) {
                Box::new(attestation_subnet_predicate::<E>(index))
            } else if topic.contains(GOSSIP_SYNC_COMMITTEE_MESSAGE) {
                Box::new(sync_committee_subnet_predicate::<E>(index))
            } else {
                return Err(Error::NoSubnetForTopic(topic));
            };

        let mut iterator = discovery.random_nodes();

        loop {
            let current_peer_count = self.pubsub().list_peers(&topic).len();
            if current_peer_count >= threshold {
                return Ok(true);
            }
            if cancel.is_cancelled() {
                return Err(Error::PeerSearchCancelled {
                    topic,
                    found: current_peer_count,
                    needed: threshold,
                });
            }

            let mut node_count = self.config.min_peers_in_subnet_search;
            // Restrict dials if a limit is applied.
            if let Some(max_dials) = self.config.max_concurrent_dials {
                node_count = std::cmp::min(node_count, max_dials);
            }

            let nodes = iterator
                .by_ref()
                .filter(|enr| predicate(enr))
                .take(node_count)
                .collect::<Vec<_>>();

            let mut dials = Vec::with_capacity(nodes.len());
            for node in nodes {
                let peer_info = match self.dialer().peer_info(&node) {
                    Some(peer_info) => peer_info,
                    None => continue,
                };
                metrics::inc_counter(&metrics::SUBNET_PEERS_DIALED);
                let dialer = self.dialer().clone();
                let log = self.log().clone();
                dials.push(tokio::spawn(async move {
                    let peer_id = peer_info.peer_id;
                    if let Err(e) = dialer.connect_with_peer(peer_info).await {
                        debug!(
                            log,
                            "Could not connect with peer";
                            "peer_id" => %peer_id,
                            "error" => %e
                        );
                    }
                }));
            }
            // The next iteration must not begin until every dial in this
            // batch has settled.
            futures::future::join_all(dials).await;
            // An exhausted iterator yields empty batches; stay cooperative
            // so cancellation can be observed.
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::subnets::{AttestationBitfieldEntry, ATTESTATION_BITFIELD_ENR_KEY};
    use discv5::enr::CombinedKey;
    use types::{EnrAttestationBitfield, MainnetEthSpec};

    type E = MainnetEthSpec;

    fn enr_on_attestation_subnet(index: usize) -> Enr {
        let key = CombinedKey::generate_secp256k1();
        let mut bitfield = EnrAttestationBitfield::<E>::default();
        bitfield.set(index, true).unwrap();
        Enr::builder()
            .add_value(
                ATTESTATION_BITFIELD_ENR_KEY,
                &AttestationBitfieldEntry::<E>(bitfield),
            )
            .build(&key)
            .expect("enr should build")
    }

    fn enr_without_subnets() -> Enr {
        let key = CombinedKey::generate_secp256k1();
        Enr::builder().build(&key).expect("enr should build")
    }

    #[test]
    fn attestation_predicate_reads_the_bitfield() {
        let enr = enr_on_attestation_subnet(7);
        assert!(attestation_subnet_predicate::<E>(7)(&enr));
        assert!(!attestation_subnet_predicate::<E>(8)(&enr));
        assert!(!attestation_subnet_predicate::<E>(7)(&enr_without_subnets()));
    }

    #[tokio::test]
    async fn disabled_discovery_short_circuits() {
        let rig = TestRig::without_discovery();
        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "beacon_attestation_7", 7, 4)
            .await;
        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test]
    async fn unknown_topic_is_an_error() {
        let rig = TestRig::new();
        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "voluntary_exit", 0, 1)
            .await;
        assert!(matches!(result, Err(Error::NoSubnetForTopic(_))));
    }

    #[tokio::test]
    async fn threshold_already_met_returns_without_dialing() {
        let rig = TestRig::new();
        rig.network
            .add_topic_peers("beacon_attestation_7/ssz_snappy", 4);
        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "beacon_attestation_7", 7, 4)
            .await;
        assert!(matches!(result, Ok(true)));
        assert_eq!(rig.network.dial_count(), 0);
    }

    // Four candidate peers advertising the subnet are found and dialed in
    // a single batch, which meets the threshold.
    #[tokio::test]
    async fn dials_candidates_until_threshold_met() {
        let rig = TestRig::new();
        rig.network.join_on_connect("beacon_attestation_7/ssz_snappy");
        let candidates = (0..4).map(|_| enr_on_attestation_subnet(7)).collect();
        rig.discovery.set_nodes(candidates);
        // Nodes not on the subnet are filtered, never dialed.
        rig.discovery.push_node(enr_without_subnets());

        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "beacon_attestation_7", 7, 4)
            .await;

        assert!(matches!(result, Ok(true)));
        assert_eq!(rig.network.dial_count(), 4);
    }

    #[tokio::test]
    async fn dial_cap_bounds_each_batch() {
        let mut config = crate::NetworkConfig::default();
        config.max_concurrent_dials = Some(2);
        let rig = TestRig::with_config(config);
        rig.network.join_on_connect("beacon_attestation_3/ssz_snappy");
        let candidates = (0..4).map(|_| enr_on_attestation_subnet(3)).collect();
        rig.discovery.set_nodes(candidates);

        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "beacon_attestation_3", 3, 4)
            .await;

        assert!(matches!(result, Ok(true)));
        // Two batches of at most two dials each.
        assert_eq!(rig.network.dial_count(), 4);
        assert!(rig.network.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn cancellation_reports_found_and_needed() {
        let rig = TestRig::new();
        rig.network
            .add_topic_peers("beacon_attestation_7/ssz_snappy", 1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "beacon_attestation_7", 7, 4)
            .await;
        match result {
            Err(Error::PeerSearchCancelled {
                topic,
                found,
                needed,
            }) => {
                assert_eq!(topic, "beacon_attestation_7/ssz_snappy");
                assert_eq!(found, 1);
                assert_eq!(needed, 4);
            }
            other => panic!("expected cancellation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn sync_committee_topic_uses_sync_predicate() {
        use crate::subnets::{SyncCommitteeBitfieldEntry, SYNC_COMMITTEE_BITFIELD_ENR_KEY};
        use types::EnrSyncCommitteeBitfield;

        let rig = TestRig::new();
        rig.network.join_on_connect("sync_committee_1/ssz_snappy");
        // A peer on attestation subnet 1 is not a sync subnet 1 peer.
        rig.discovery.push_node(enr_on_attestation_subnet(1));

        let key = CombinedKey::generate_secp256k1();
        let mut syncnets = EnrSyncCommitteeBitfield::<E>::default();
        syncnets.set(1, true).unwrap();
        let sync_peer = Enr::builder()
            .add_value(
                SYNC_COMMITTEE_BITFIELD_ENR_KEY,
                &SyncCommitteeBitfieldEntry::<E>(syncnets),
            )
            .build(&key)
            .expect("enr should build");
        rig.discovery.push_node(sync_peer);

        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "sync_committee_1", 1, 1)
            .await;

        assert!(matches!(result, Ok(true)));
        // Only the sync subnet peer was dialed.
        assert_eq!(rig.network.dial_count(), 1);
    }

    #[tokio::test]
    async fn broadcast_gate_needs_only_one_peer() {
        let rig = TestRig::new();
        assert!(!rig.service.has_peer_with_subnet("beacon_attestation_7"));
        rig.network
            .add_topic_peers("beacon_attestation_7/ssz_snappy", 1);
        assert!(rig.service.has_peer_with_subnet("beacon_attestation_7"));
    }

    // A record that cannot be converted to a dialable address is skipped;
    // the rest of the batch still dials.
    #[tokio::test]
    async fn failed_conversions_are_skipped() {
        let rig = TestRig::new();
        rig.network.join_on_connect("beacon_attestation_5/ssz_snappy");
        rig.network.fail_conversions(1);
        let candidates = (0..2).map(|_| enr_on_attestation_subnet(5)).collect();
        rig.discovery.set_nodes(candidates);

        let cancel = CancellationToken::new();
        let result = rig
            .service
            .find_peers_with_subnet(&cancel, "beacon_attestation_5", 5, 1)
            .await;

        assert!(matches!(result, Ok(true)));
        assert_eq!(*rig.network.peer_info_calls.lock(), 2);
        assert_eq!(rig.network.dial_count(), 1);
    }
}
